use crate::consts::MODULE_RECORD;
use crate::store::SymbolStoreEntry;

/// `MODULE <os> <cpu> <guid> <debug_file>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
  pub os: String,
  pub cpu: String,
  pub guid: String,
  pub debug_file: String,
}

impl ModuleHeader {
  /// Whether a raw first line announces a module at all.
  pub fn is_module_line(line: &[u8]) -> bool {
    line.starts_with(MODULE_RECORD.as_bytes())
  }

  /// Parse a module line. Returns `None` when any of the four fields is missing.
  pub fn parse(line: &str) -> Option<Self> {
    let mut fields = line.split_whitespace();
    if fields.next()? != MODULE_RECORD {
      return None;
    }
    Some(Self {
      os: fields.next()?.to_string(),
      cpu: fields.next()?.to_string(),
      guid: fields.next()?.to_string(),
      debug_file: fields.next()?.to_string(),
    })
  }

  pub fn store_entry(&self) -> SymbolStoreEntry {
    SymbolStoreEntry::new(&self.debug_file, &self.guid)
  }
}

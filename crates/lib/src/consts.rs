/// Record tag of the first line of every dumper invocation.
pub const MODULE_RECORD: &str = "MODULE";

/// Record tag naming a source file referenced by line-number data.
pub const FILE_RECORD: &str = "FILE";

/// Environment variable holding the path to `pdbstr.exe`.
pub const PDBSTR_PATH_VAR: &str = "PDBSTR_PATH";

mod dump;

pub use dump::{DumpArgs, cmd_dump};

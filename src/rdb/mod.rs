mod encoding;
mod opcode;
mod rdb_parser;

pub use rdb_parser::{parse_rdb_file, DatabaseEntry, RdbError, RdbParser};

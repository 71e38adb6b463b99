//! Snapshot file decoding.
//!
//! A snapshot starts with a nine byte header (`REDIS` plus a four digit
//! version), followed by top-level units introduced by an op code: auxiliary
//! fields, database sections and a final end-of-file marker. Each database
//! section carries key/value entries, optionally preceded by an absolute
//! expiry timestamp.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use jiff::Timestamp;
use thiserror::Error;

use crate::key_value_store::DataType;
use crate::rdb::encoding::{parse_size, parse_string, peek_byte, read_byte, read_exact_bytes};
use crate::rdb::opcode::{
    is_section_indicator, HASH_MAP_VALUE_TYPE, LIST_VALUE_TYPE, OP_AUX, OP_EOF, OP_EXPIRE_TIME,
    OP_EXPIRE_TIME_MS, OP_RESIZE_DB, OP_SELECT_DB, SET_VALUE_TYPE, STRING_VALUE_TYPE,
};

#[derive(Error, Debug, PartialEq)]
pub enum RdbError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("expected a length-encoded integer")]
    ExpectedLengthEncodedInteger,
}

impl From<std::io::Error> for RdbError {
    fn from(err: std::io::Error) -> Self {
        RdbError::Io(err.to_string())
    }
}

/// One key/value pair decoded from a snapshot.
#[derive(Debug, PartialEq)]
pub struct DatabaseEntry {
    pub database_index: usize,
    pub key: Vec<u8>,
    pub value: DataType,
    pub expiry: Option<Timestamp>,
}

pub struct RdbParser<R> {
    reader: R,
}

impl<R: BufRead> RdbParser<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Decodes the whole snapshot and returns its entries in file order.
    pub fn parse(mut self) -> Result<Vec<DatabaseEntry>, RdbError> {
        self.check_header()?;

        let mut entries = Vec::new();

        loop {
            let op_code = read_byte(&mut self.reader)?;

            match op_code {
                OP_AUX => {
                    // Arbitrary key-value settings; nothing here is used at runtime.
                    parse_string(&mut self.reader)?;
                    parse_string(&mut self.reader)?;
                }
                OP_SELECT_DB => {
                    let database_entries = self.parse_database()?;
                    entries.extend(database_entries);
                }
                OP_EOF => return Ok(entries),
                op_code => {
                    return Err(RdbError::Syntax(format!(
                        "unknown op code 0x{:02X}",
                        op_code
                    )))
                }
            }
        }
    }

    /// Validates the magic string and the four digit version number.
    fn check_header(&mut self) -> Result<(), RdbError> {
        let magic_string = read_exact_bytes(&mut self.reader, 5)?;

        if magic_string != b"REDIS" {
            return Err(RdbError::Syntax(
                "snapshot file must begin with magic string \"REDIS\"".to_string(),
            ));
        }

        let version = read_exact_bytes(&mut self.reader, 4)?;

        std::str::from_utf8(&version)
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| RdbError::Syntax("snapshot version number is invalid".to_string()))?;

        Ok(())
    }

    fn parse_database(&mut self) -> Result<Vec<DatabaseEntry>, RdbError> {
        let database_index = parse_size(&mut self.reader)?;

        self.parse_hash_table_sizes()?;

        let mut entries = Vec::new();

        loop {
            let next_byte = peek_byte(&mut self.reader)?;

            if is_section_indicator(next_byte) {
                return Ok(entries);
            }

            entries.push(self.parse_database_entry(database_index)?);
        }
    }

    /// Consumes the optional resize-db hint. The sizes are advisory only.
    fn parse_hash_table_sizes(&mut self) -> Result<(), RdbError> {
        if peek_byte(&mut self.reader)? != OP_RESIZE_DB {
            return Ok(());
        }

        read_byte(&mut self.reader)?;
        parse_size(&mut self.reader)?;
        parse_size(&mut self.reader)?;

        Ok(())
    }

    fn parse_database_entry(&mut self, database_index: usize) -> Result<DatabaseEntry, RdbError> {
        let mut expiry = None;

        let next_byte = peek_byte(&mut self.reader)?;

        if next_byte == OP_EXPIRE_TIME || next_byte == OP_EXPIRE_TIME_MS {
            expiry = Some(self.parse_entry_expiry()?);
        }

        let value_type = read_byte(&mut self.reader)?;
        let key = parse_string(&mut self.reader)?;
        let value = self.parse_typed_value(value_type)?;

        Ok(DatabaseEntry {
            database_index,
            key,
            value,
            expiry,
        })
    }

    fn parse_entry_expiry(&mut self) -> Result<Timestamp, RdbError> {
        let op_code = read_byte(&mut self.reader)?;

        match op_code {
            OP_EXPIRE_TIME => {
                let buffer = read_exact_bytes(&mut self.reader, 4)?;
                let seconds = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);

                Timestamp::from_second(seconds as i64).map_err(|err| {
                    RdbError::Syntax(format!("invalid expire timestamp: {}", err))
                })
            }
            OP_EXPIRE_TIME_MS => {
                let buffer = read_exact_bytes(&mut self.reader, 8)?;
                let milliseconds = u64::from_le_bytes([
                    buffer[0], buffer[1], buffer[2], buffer[3], buffer[4], buffer[5], buffer[6],
                    buffer[7],
                ]);

                Timestamp::from_millisecond(milliseconds as i64).map_err(|err| {
                    RdbError::Syntax(format!("invalid expire timestamp: {}", err))
                })
            }
            op_code => Err(RdbError::Syntax(format!(
                "unexpected expire op code 0x{:02X}",
                op_code
            ))),
        }
    }

    fn parse_typed_value(&mut self, value_type: u8) -> Result<DataType, RdbError> {
        match value_type {
            STRING_VALUE_TYPE => Ok(DataType::String(parse_string(&mut self.reader)?)),
            LIST_VALUE_TYPE => Ok(DataType::List(self.parse_string_sequence()?)),
            SET_VALUE_TYPE => {
                let members = self.parse_string_sequence()?;

                Ok(DataType::Set(HashSet::from_iter(members)))
            }
            HASH_MAP_VALUE_TYPE => {
                let size = parse_size(&mut self.reader)?;
                let mut hash_map = HashMap::with_capacity(size);

                for _ in 0..size {
                    let field = parse_string(&mut self.reader)?;
                    let value = parse_string(&mut self.reader)?;
                    hash_map.insert(field, value);
                }

                Ok(DataType::Hash(hash_map))
            }
            value_type => Err(RdbError::Syntax(format!(
                "unsupported value type {}",
                value_type
            ))),
        }
    }

    fn parse_string_sequence(&mut self) -> Result<Vec<Vec<u8>>, RdbError> {
        let size = parse_size(&mut self.reader)?;
        let mut sequence = Vec::with_capacity(size);

        for _ in 0..size {
            sequence.push(parse_string(&mut self.reader)?);
        }

        Ok(sequence)
    }
}

/// Opens and decodes the snapshot at `path`.
pub fn parse_rdb_file<P: AsRef<Path>>(path: P) -> Result<Vec<DatabaseEntry>, RdbError> {
    let file = File::open(path.as_ref()).map_err(|err| {
        RdbError::Io(format!(
            "failed to open \"{}\": {}",
            path.as_ref().display(),
            err
        ))
    })?;

    RdbParser::new(BufReader::new(file)).parse()
}

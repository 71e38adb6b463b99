//! Length encoding and string forms of the snapshot format.
//!
//! A length starts with one byte whose two most significant bits select the
//! encoding: `00` puts the length in the remaining six bits, `01` extends it
//! with one more byte into a big-endian 14-bit value, `10` discards the six
//! bits and reads a big-endian 32-bit length, and `11` marks a special string
//! form (an integer rendered in decimal, or an LZF-compressed string).

use std::io::BufRead;

use crate::rdb::rdb_parser::RdbError;

const LENGTH_ENCODING_6_BIT: u8 = 0b00;
const LENGTH_ENCODING_14_BIT: u8 = 0b01;
const LENGTH_ENCODING_32_BIT: u8 = 0b10;

const INTEGER_STRING_8_BIT: u8 = 0;
const INTEGER_STRING_16_BIT: u8 = 1;
const INTEGER_STRING_32_BIT: u8 = 2;
const COMPRESSED_STRING: u8 = 3;

#[derive(Debug, PartialEq)]
pub(crate) enum ValueEncoding {
    /// A plain length: the next `n` bytes are the string.
    String(usize),
    Int8,
    Int16,
    Int32,
    LzfCompressedString,
}

pub(crate) fn read_byte<R: BufRead>(reader: &mut R) -> Result<u8, RdbError> {
    let mut buffer = [0u8; 1];
    reader.read_exact(&mut buffer)?;

    Ok(buffer[0])
}

pub(crate) fn read_exact_bytes<R: BufRead>(
    reader: &mut R,
    count: usize,
) -> Result<Vec<u8>, RdbError> {
    let mut buffer = vec![0u8; count];
    reader.read_exact(&mut buffer)?;

    Ok(buffer)
}

/// Returns the next byte without consuming it. The stream ending here is an
/// I/O error: callers only peek inside a section that must still terminate.
pub(crate) fn peek_byte<R: BufRead>(reader: &mut R) -> Result<u8, RdbError> {
    let buffer = reader.fill_buf()?;

    match buffer.first() {
        Some(&byte) => Ok(byte),
        None => Err(RdbError::Io("unexpected end of file".to_string())),
    }
}

pub(crate) fn parse_length<R: BufRead>(reader: &mut R) -> Result<ValueEncoding, RdbError> {
    let first_byte = read_byte(reader)?;

    let encoding_type = first_byte >> 6;
    let last_six_bits = first_byte & 0b0011_1111;

    match encoding_type {
        LENGTH_ENCODING_6_BIT => Ok(ValueEncoding::String(last_six_bits as usize)),
        LENGTH_ENCODING_14_BIT => {
            let next_byte = read_byte(reader)?;
            let length = ((last_six_bits as usize) << 8) | next_byte as usize;

            Ok(ValueEncoding::String(length))
        }
        LENGTH_ENCODING_32_BIT => {
            let buffer = read_exact_bytes(reader, 4)?;
            let length = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);

            Ok(ValueEncoding::String(length as usize))
        }
        _ => match last_six_bits {
            INTEGER_STRING_8_BIT => Ok(ValueEncoding::Int8),
            INTEGER_STRING_16_BIT => Ok(ValueEncoding::Int16),
            INTEGER_STRING_32_BIT => Ok(ValueEncoding::Int32),
            COMPRESSED_STRING => Ok(ValueEncoding::LzfCompressedString),
            encoding => Err(RdbError::Syntax(format!(
                "unsupported string encoding {}",
                encoding
            ))),
        },
    }
}

/// Parses a length that must not be one of the special string encodings.
pub(crate) fn parse_size<R: BufRead>(reader: &mut R) -> Result<usize, RdbError> {
    match parse_length(reader)? {
        ValueEncoding::String(size) => Ok(size),
        _ => Err(RdbError::ExpectedLengthEncodedInteger),
    }
}

/// Parses a length-encoded string, covering the plain, integer and
/// LZF-compressed forms. Integers are rendered in decimal.
pub(crate) fn parse_string<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, RdbError> {
    match parse_length(reader)? {
        ValueEncoding::String(length) => read_exact_bytes(reader, length),
        ValueEncoding::Int8 => {
            let byte = read_byte(reader)?;

            Ok((byte as i8).to_string().into_bytes())
        }
        ValueEncoding::Int16 => {
            let buffer = read_exact_bytes(reader, 2)?;
            let value = i16::from_le_bytes([buffer[0], buffer[1]]);

            Ok(value.to_string().into_bytes())
        }
        ValueEncoding::Int32 => {
            let buffer = read_exact_bytes(reader, 4)?;
            let value = i32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);

            Ok(value.to_string().into_bytes())
        }
        ValueEncoding::LzfCompressedString => parse_compressed_string(reader),
    }
}

fn parse_compressed_string<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, RdbError> {
    let compressed_length = parse_size(reader)?;
    let uncompressed_length = parse_size(reader)?;

    let compressed = read_exact_bytes(reader, compressed_length)?;

    let decompressed = lzf::decompress(&compressed, uncompressed_length)
        .map_err(|err| RdbError::Syntax(format!("failed to decompress string: {}", err)))?;

    if decompressed.len() != uncompressed_length {
        return Err(RdbError::Syntax(format!(
            "decompressed string length {} does not match expected length {}",
            decompressed.len(),
            uncompressed_length
        )));
    }

    Ok(decompressed)
}

//! RESP frame parsing and encoding.
//!
//! Frames are decoded incrementally from a buffered reader: the first byte
//! selects the variant, scalar variants occupy a single line terminated by
//! `\n`, and bulk strings carry an exact byte count followed by a `\r\n`
//! terminator. Encoding is the exact inverse, so a well-formed frame survives
//! an encode/decode round trip byte for byte.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

const ARRAY_PREFIX: u8 = b'*';
const BULK_STRING_PREFIX: u8 = b'$';
const ERROR_PREFIX: u8 = b'-';
const INTEGER_PREFIX: u8 = b':';
const SIMPLE_STRING_PREFIX: u8 = b'+';

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    /// The stream ended cleanly at a frame boundary.
    #[error("end of stream")]
    Eof,
    /// The bytes on the wire do not form a valid frame. The reader's position
    /// is no longer trusted after this error.
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RespError {
    fn from(err: std::io::Error) -> Self {
        RespError::Io(err.to_string())
    }
}

/// A single RESP frame as read from or written to the wire.
///
/// Bulk strings are 8-bit clean and therefore carry raw bytes; simple strings
/// and errors are line-oriented and must not contain `\r` or `\n`.
#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Vec<u8>),
    NullBulkString,
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Decodes one complete frame from the reader.
    ///
    /// # Returns
    ///
    /// * `Ok(RespValue)` - The next frame on the stream
    /// * `Err(RespError::Eof)` - The stream ended before the first byte of a frame
    /// * `Err(RespError::Syntax)` - The bytes do not form a valid frame
    /// * `Err(RespError::Io)` - The underlying reader failed or ended mid-frame
    pub async fn parse<R>(reader: &mut R) -> Result<RespValue, RespError>
    where
        R: AsyncBufRead + Unpin,
    {
        let prefix = peek_byte(reader).await?;

        match prefix {
            ARRAY_PREFIX => parse_array(reader).await,
            BULK_STRING_PREFIX => parse_bulk_string(reader).await,
            INTEGER_PREFIX => parse_integer(reader).await,
            SIMPLE_STRING_PREFIX => parse_simple_string(reader).await,
            ERROR_PREFIX => parse_error(reader).await,
            prefix => Err(RespError::Syntax(format!(
                "unsupported data type \"{}\"",
                prefix as char
            ))),
        }
    }

    /// Encodes the frame as a complete, standalone byte sequence.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RespValue::SimpleString(value) => format!("+{}\r\n", value).into_bytes(),
            RespValue::Error(message) => format!("-{}\r\n", message).into_bytes(),
            RespValue::Integer(value) => format!(":{}\r\n", value).into_bytes(),
            RespValue::BulkString(bytes) => {
                let mut encoded = format!("${}\r\n", bytes.len()).into_bytes();
                encoded.extend_from_slice(bytes);
                encoded.extend_from_slice(b"\r\n");
                encoded
            }
            RespValue::NullBulkString => b"$-1\r\n".to_vec(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len()).into_bytes();
                for element in elements {
                    encoded.extend_from_slice(&element.encode());
                }
                encoded
            }
        }
    }
}

/// Returns the next byte on the stream without consuming it.
async fn peek_byte<R>(reader: &mut R) -> Result<u8, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let buffer = reader.fill_buf().await?;

    match buffer.first() {
        Some(&byte) => Ok(byte),
        None => Err(RespError::Eof),
    }
}

/// Reads one line up to and including `\n` and strips the trailing `\r\n`
/// (or bare `\n`). The stream ending before the delimiter is an I/O error,
/// not a clean end of stream: the frame has already started.
async fn read_frame_line<R>(reader: &mut R) -> Result<Vec<u8>, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let bytes_read = reader.read_until(b'\n', &mut line).await?;

    if bytes_read == 0 || !line.ends_with(b"\n") {
        return Err(RespError::Io("unexpected end of stream".to_string()));
    }

    if line.ends_with(b"\r\n") {
        line.truncate(line.len() - 2);
    } else {
        line.truncate(line.len() - 1);
    }

    Ok(line)
}

/// Validates the prefix byte of a frame line and returns the content after it.
fn line_content<'a>(line: &'a [u8], prefix: u8, variant: &str) -> Result<&'a [u8], RespError> {
    if line.first() != Some(&prefix) {
        return Err(RespError::Syntax(format!(
            "malformed {} - must begin with \"{}\" prefix",
            variant, prefix as char
        )));
    }

    if line.len() < 2 {
        return Err(RespError::Syntax(format!(
            "malformed {} - expected content after \"{}\" prefix",
            variant, prefix as char
        )));
    }

    Ok(&line[1..])
}

fn parse_decimal(content: &[u8], variant: &str) -> Result<i64, RespError> {
    std::str::from_utf8(content)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            RespError::Syntax(format!(
                "malformed {} \"{}\"",
                variant,
                String::from_utf8_lossy(content)
            ))
        })
}

async fn parse_array<R>(reader: &mut R) -> Result<RespValue, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_frame_line(reader).await?;
    let content = line_content(&line, ARRAY_PREFIX, "array")?;
    let length = parse_decimal(content, "array length")?;

    if length < 0 {
        return Err(RespError::Syntax(format!(
            "malformed array length \"{}\"",
            length
        )));
    }

    let mut elements = Vec::with_capacity(length as usize);

    for _ in 0..length {
        let element = Box::pin(RespValue::parse(reader)).await?;
        elements.push(element);
    }

    Ok(RespValue::Array(elements))
}

async fn parse_bulk_string<R>(reader: &mut R) -> Result<RespValue, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_frame_line(reader).await?;
    let content = line_content(&line, BULK_STRING_PREFIX, "bulk string")?;
    let length = parse_decimal(content, "bulk string length")?;

    if length == -1 {
        return Ok(RespValue::NullBulkString);
    }

    if length < 0 {
        return Err(RespError::Syntax(format!(
            "malformed bulk string length \"{}\"",
            length
        )));
    }

    // The declared byte count plus the `\r\n` terminator.
    let mut data = vec![0u8; length as usize + 2];

    if let Err(err) = reader.read_exact(&mut data).await {
        return Err(match err.kind() {
            std::io::ErrorKind::UnexpectedEof => RespError::Syntax(format!(
                "bulk string shorter than declared length {}",
                length
            )),
            _ => RespError::Io(err.to_string()),
        });
    }

    if !data.ends_with(b"\r\n") {
        return Err(RespError::Syntax(format!(
            "bulk string of length {} is missing its terminator",
            length
        )));
    }

    data.truncate(length as usize);

    Ok(RespValue::BulkString(data))
}

async fn parse_integer<R>(reader: &mut R) -> Result<RespValue, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_frame_line(reader).await?;
    let content = line_content(&line, INTEGER_PREFIX, "integer")?;
    let value = parse_decimal(content, "integer value")?;

    Ok(RespValue::Integer(value))
}

async fn parse_simple_string<R>(reader: &mut R) -> Result<RespValue, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_frame_line(reader).await?;
    let content = line_content(&line, SIMPLE_STRING_PREFIX, "simple string")?;

    let value = String::from_utf8(content.to_vec())
        .map_err(|_| RespError::Syntax("invalid UTF-8 in simple string".to_string()))?;

    Ok(RespValue::SimpleString(value))
}

async fn parse_error<R>(reader: &mut R) -> Result<RespValue, RespError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_frame_line(reader).await?;
    let content = line_content(&line, ERROR_PREFIX, "error")?;

    let message = String::from_utf8(content.to_vec())
        .map_err(|_| RespError::Syntax("invalid UTF-8 in error".to_string()))?;

    Ok(RespValue::Error(message))
}

//! Outbound replication handshake.
//!
//! A replica introduces itself to its master once at startup: `PING`, then
//! `REPLCONF listening-port <port>`, then `REPLCONF capa psync2`, verifying
//! the fixed-size response after each step. Streaming from the master is out
//! of scope; the connection is closed when the handshake completes.

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::resp::RespValue;

#[derive(Error, Debug, PartialEq)]
pub enum HandshakeError {
    #[error("failed to connect to master server: {0}")]
    Connect(String),
    #[error("failed to send \"{command}\" command: {detail}")]
    Send { command: String, detail: String },
    #[error("failed to read \"{command}\" response: {detail}")]
    Read { command: String, detail: String },
    #[error("unexpected \"{command}\" response from master: \"{response}\"")]
    UnexpectedResponse { command: String, response: String },
}

pub async fn perform_handshake(
    host: &str,
    master_port: u16,
    listening_port: u16,
) -> Result<(), HandshakeError> {
    let mut stream = TcpStream::connect((host, master_port))
        .await
        .map_err(|err| HandshakeError::Connect(err.to_string()))?;

    // The PING response contains the 7 bytes of +PONG\r\n; each REPLCONF
    // success response contains the 5 bytes of +OK\r\n.
    send_handshake_command(&mut stream, "PING", vec![b"PING".to_vec()], b"+PONG\r\n").await?;

    send_handshake_command(
        &mut stream,
        "REPLCONF listening-port",
        vec![
            b"REPLCONF".to_vec(),
            b"listening-port".to_vec(),
            listening_port.to_string().into_bytes(),
        ],
        b"+OK\r\n",
    )
    .await?;

    send_handshake_command(
        &mut stream,
        "REPLCONF capa",
        vec![b"REPLCONF".to_vec(), b"capa".to_vec(), b"psync2".to_vec()],
        b"+OK\r\n",
    )
    .await?;

    Ok(())
}

async fn send_handshake_command(
    stream: &mut TcpStream,
    command: &str,
    parts: Vec<Vec<u8>>,
    expected: &[u8],
) -> Result<(), HandshakeError> {
    let frame = RespValue::Array(parts.into_iter().map(RespValue::BulkString).collect());

    stream
        .write_all(&frame.encode())
        .await
        .map_err(|err| HandshakeError::Send {
            command: command.to_string(),
            detail: err.to_string(),
        })?;

    let mut response = vec![0u8; expected.len()];

    stream
        .read_exact(&mut response)
        .await
        .map_err(|err| HandshakeError::Read {
            command: command.to_string(),
            detail: err.to_string(),
        })?;

    if response != expected {
        return Err(HandshakeError::UnexpectedResponse {
            command: command.to_string(),
            response: String::from_utf8_lossy(&response).into_owned(),
        });
    }

    Ok(())
}

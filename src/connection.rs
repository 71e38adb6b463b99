//! Per-connection request loop.

use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use crate::commands::handle_request;
use crate::key_value_store::KeyValueStore;
use crate::resp::{RespError, RespValue};
use crate::server::RedisServer;

/// Decodes frames off the socket, dispatches them and writes the responses
/// back in order, until the client disconnects or shutdown is signalled.
pub async fn handle_client_connection(
    stream: TcpStream,
    server: Arc<RedisServer>,
    store: Arc<Mutex<KeyValueStore>>,
) {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let input = tokio::select! {
            _ = server.shutdown.cancelled() => return,
            result = RespValue::parse(&mut reader) => match result {
                Ok(input) => input,
                Err(RespError::Eof) => return,
                Err(RespError::Syntax(detail)) => {
                    // The reader position is not trusted after a syntax
                    // error; report it and drop the connection.
                    let error = RespValue::Error(format!("ERR {}", detail));
                    let _ = writer.write_all(&error.encode()).await;
                    return;
                }
                Err(RespError::Io(detail)) => {
                    debug!("connection read failed: {}", detail);
                    return;
                }
            }
        };

        let responses = handle_request(&input, &server, &store).await;

        for response in responses {
            if server.shutdown.is_cancelled() {
                return;
            }

            if let Err(err) = writer.write_all(&response).await {
                debug!("connection write failed: {}", err);
                return;
            }
        }
    }
}

//! Request dispatch.
//!
//! A request is either an array of bulk strings or a bare string naming an
//! inline command. Inside an array the engine walks left to right: each
//! position names a command, the command consumes as many following elements
//! as its arity dictates, and exactly one response is emitted per command.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{
        command_error::CommandError,
        config_get::{self, ConfigGetArguments},
        echo::{self, EchoArguments},
        get::{self, GetArguments},
        info::{self, InfoArguments},
        keys::{self, KeysArguments},
        ping, psync, replconf,
        set::{self, SetArguments},
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    server::RedisServer,
};

/// Dispatches one decoded request and returns its responses in order.
pub async fn handle_request(
    input: &RespValue,
    server: &Arc<RedisServer>,
    store: &Arc<Mutex<KeyValueStore>>,
) -> Vec<Vec<u8>> {
    match input {
        RespValue::Array(elements) => handle_batch(elements, server, store).await,
        // Inline single-word commands arrive as a bare string.
        RespValue::BulkString(name) => {
            vec![execute_command(name, &[], server, store).await.0]
        }
        RespValue::SimpleString(name) => {
            vec![execute_command(name.as_bytes(), &[], server, store).await.0]
        }
        _ => vec![CommandError::InvalidRequest.as_bytes()],
    }
}

async fn handle_batch(
    elements: &[RespValue],
    server: &Arc<RedisServer>,
    store: &Arc<Mutex<KeyValueStore>>,
) -> Vec<Vec<u8>> {
    let mut responses = Vec::new();
    let mut cursor = 0;

    while cursor < elements.len() {
        let RespValue::BulkString(name) = &elements[cursor] else {
            // Without a command name there is no arity to resynchronize on.
            responses.push(CommandError::CommandNameNotBulkString.as_bytes());
            break;
        };

        let arguments = &elements[cursor + 1..];
        let (response, consumed) = execute_command(name, arguments, server, store).await;

        responses.push(response);
        cursor += 1 + consumed;
    }

    responses
}

/// Executes one command against the elements that follow its name.
///
/// # Returns
///
/// The encoded response and the number of elements the command consumed,
/// which the batch walk uses to advance its cursor. Argument errors still
/// consume the command's arity so the walk can resynchronize.
async fn execute_command(
    name: &[u8],
    arguments: &[RespValue],
    server: &Arc<RedisServer>,
    store: &Arc<Mutex<KeyValueStore>>,
) -> (Vec<u8>, usize) {
    match name.to_ascii_uppercase().as_slice() {
        b"PING" => (ping::ping(), 0),
        b"ECHO" => {
            let consumed = arguments.len().min(1);

            match EchoArguments::parse(arguments) {
                Ok(echo_arguments) => (echo::echo(&echo_arguments), consumed),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"GET" => {
            let consumed = arguments.len().min(1);

            match GetArguments::parse(arguments) {
                Ok(get_arguments) => (get::get(store, &get_arguments).await, consumed),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"SET" => {
            let consumed = SetArguments::consumed(arguments);

            match SetArguments::parse(arguments) {
                Ok(set_arguments) => (set::set(store, set_arguments).await, consumed),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"KEYS" => {
            let consumed = arguments.len().min(1);

            match KeysArguments::parse(arguments) {
                Ok(keys_arguments) => (keys::keys(store, &keys_arguments).await, consumed),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"CONFIG" => {
            // The subcommand owns everything that follows it.
            let consumed = arguments.len();

            match ConfigGetArguments::parse(arguments) {
                Ok(config_arguments) => (
                    config_get::config_get(server.as_ref(), &config_arguments),
                    consumed,
                ),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"INFO" => {
            let consumed = arguments.len().min(1);

            match InfoArguments::parse(arguments) {
                Ok(info_arguments) => (info::info(server.as_ref(), &info_arguments), consumed),
                Err(err) => (err.as_bytes(), consumed),
            }
        }
        b"REPLCONF" => (replconf::replconf(), arguments.len().min(2)),
        b"PSYNC" => (psync::psync(server.as_ref()), arguments.len().min(2)),
        _ => (
            CommandError::UnsupportedCommand(String::from_utf8_lossy(name).into_owned())
                .as_bytes(),
            arguments.len(),
        ),
    }
}

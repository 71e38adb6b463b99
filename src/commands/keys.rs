use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct KeysArguments {
    pub pattern: Vec<u8>,
}

impl KeysArguments {
    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        let Some(argument) = arguments.first() else {
            return Err(CommandError::KeysMissingArgument);
        };

        match argument {
            RespValue::BulkString(bytes) => Ok(Self {
                pattern: bytes.clone(),
            }),
            _ => Err(CommandError::KeysArgumentNotString),
        }
    }
}

/// Lists all keys for the literal `*` pattern. Any other pattern matches
/// nothing and replies an empty array.
pub async fn keys(store: &Arc<Mutex<KeyValueStore>>, arguments: &KeysArguments) -> Vec<u8> {
    if arguments.pattern.as_slice() != b"*" {
        return RespValue::Array(Vec::new()).encode();
    }

    let store_guard = store.lock().await;

    let entries = store_guard
        .keys()
        .into_iter()
        .map(RespValue::BulkString)
        .collect();

    RespValue::Array(entries).encode()
}

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError,
    key_value_store::{DataType, KeyValueStore},
    resp::RespValue,
};

pub struct GetArguments {
    pub key: Vec<u8>,
}

impl GetArguments {
    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        let Some(argument) = arguments.first() else {
            return Err(CommandError::GetMissingArgument);
        };

        match argument {
            RespValue::BulkString(bytes) => Ok(Self { key: bytes.clone() }),
            _ => Err(CommandError::GetArgumentNotString),
        }
    }
}

/// Looks up a key. Absent or expired keys reply a null bulk string; values
/// loaded from a snapshot that are not string-shaped are rejected.
pub async fn get(store: &Arc<Mutex<KeyValueStore>>, arguments: &GetArguments) -> Vec<u8> {
    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments.key) {
        Some(value) => match &value.data {
            DataType::String(bytes) => RespValue::BulkString(bytes.clone()).encode(),
            _ => CommandError::UnsupportedDataType.as_bytes(),
        },
        None => RespValue::NullBulkString.encode(),
    }
}

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError,
    key_value_store::{DataType, KeyValueStore, Value},
    resp::RespValue,
};

pub struct SetArguments {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub expiration: Option<Timestamp>,
}

impl SetArguments {
    /// How many batch elements this SET owns: key and value, plus the `PX`
    /// token and its millisecond count when present. An unrecognized third
    /// token is not consumed.
    pub fn consumed(arguments: &[RespValue]) -> usize {
        if arguments.len() >= 3 && is_px_option(&arguments[2]) {
            if arguments.len() >= 4 {
                4
            } else {
                3
            }
        } else {
            arguments.len().min(2)
        }
    }

    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::SetMissingArguments);
        }

        let RespValue::BulkString(key) = &arguments[0] else {
            return Err(CommandError::SetArgumentNotString);
        };
        let RespValue::BulkString(value) = &arguments[1] else {
            return Err(CommandError::SetArgumentNotString);
        };

        let mut expiration = None;

        // A third token other than PX is ignored and the entry never expires.
        if arguments.len() >= 3 && is_px_option(&arguments[2]) {
            let Some(expiry_argument) = arguments.get(3) else {
                return Err(CommandError::SetPxMissingExpiry);
            };

            let RespValue::BulkString(raw_expiry) = expiry_argument else {
                return Err(CommandError::SetPxInvalidExpiry);
            };

            let milliseconds = std::str::from_utf8(raw_expiry)
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .ok_or(CommandError::SetPxInvalidExpiry)?;

            let expiry = Timestamp::now()
                .checked_add(Duration::from_millis(milliseconds))
                .map_err(|_| CommandError::SetPxInvalidExpiry)?;

            expiration = Some(expiry);
        }

        Ok(Self {
            key: key.clone(),
            value: value.clone(),
            expiration,
        })
    }
}

pub async fn set(store: &Arc<Mutex<KeyValueStore>>, arguments: SetArguments) -> Vec<u8> {
    let mut store_guard = store.lock().await;

    store_guard.set(
        arguments.key,
        Value {
            data: DataType::String(arguments.value),
            expiration: arguments.expiration,
        },
    );

    RespValue::SimpleString("OK".to_string()).encode()
}

fn is_px_option(argument: &RespValue) -> bool {
    matches!(argument, RespValue::BulkString(bytes) if bytes.eq_ignore_ascii_case(b"PX"))
}

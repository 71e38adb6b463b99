use crate::{commands::command_error::CommandError, resp::RespValue, server::RedisServer};

pub struct InfoArguments {
    pub section: Option<String>,
}

impl InfoArguments {
    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        let Some(argument) = arguments.first() else {
            return Ok(Self { section: None });
        };

        match argument {
            RespValue::BulkString(bytes) => Ok(Self {
                section: Some(String::from_utf8_lossy(bytes).to_lowercase()),
            }),
            _ => Err(CommandError::InfoArgumentNotString),
        }
    }
}

/// Replies the replication section; every other section (or no section at
/// all) replies a null bulk string.
pub fn info(server: &RedisServer, arguments: &InfoArguments) -> Vec<u8> {
    match arguments.section.as_deref() {
        // The offset token spelling matches the historical output byte for byte.
        Some("replication") => RespValue::BulkString(
            format!(
                "role:{}\nmaster_replid:{}\nnmaster_repl_offset:{}",
                server.role.as_string(),
                server.repl_id,
                server.repl_offset
            )
            .into_bytes(),
        )
        .encode(),
        _ => RespValue::NullBulkString.encode(),
    }
}

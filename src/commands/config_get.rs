use crate::{commands::command_error::CommandError, resp::RespValue, server::RedisServer};

pub struct ConfigGetArguments {
    pub parameters: Vec<String>,
}

impl ConfigGetArguments {
    /// Parses the `CONFIG` argument list. Only the `GET` subcommand is
    /// implemented; anything else reports the supported subcommand set.
    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        let Some(RespValue::BulkString(subcommand)) = arguments.first() else {
            return Err(CommandError::ConfigMissingSubcommand);
        };

        if !subcommand.eq_ignore_ascii_case(b"GET") {
            return Err(CommandError::ConfigMissingSubcommand);
        }

        let parameters = &arguments[1..];

        if parameters.is_empty() {
            return Err(CommandError::ConfigGetMissingArgument);
        }

        let mut parsed = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            let RespValue::BulkString(parameter) = parameter else {
                return Err(CommandError::ConfigGetArgumentNotString);
            };

            parsed.push(String::from_utf8_lossy(parameter).into_owned());
        }

        Ok(Self { parameters: parsed })
    }
}

/// Replies one key/value pair per requested parameter, flattened into a
/// single array. Unset parameters get a null bulk string in the value slot.
pub fn config_get(server: &RedisServer, arguments: &ConfigGetArguments) -> Vec<u8> {
    let mut entries = Vec::with_capacity(arguments.parameters.len() * 2);

    for parameter in &arguments.parameters {
        entries.push(RespValue::BulkString(parameter.clone().into_bytes()));

        match server.config.get(parameter) {
            Some(value) if !value.is_empty() => {
                entries.push(RespValue::BulkString(value.clone().into_bytes()));
            }
            _ => entries.push(RespValue::NullBulkString),
        }
    }

    RespValue::Array(entries).encode()
}

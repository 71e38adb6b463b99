use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct EchoArguments {
    pub message: Vec<u8>,
}

impl EchoArguments {
    pub fn parse(arguments: &[RespValue]) -> Result<Self, CommandError> {
        let Some(argument) = arguments.first() else {
            return Err(CommandError::EchoMissingArgument);
        };

        match argument {
            RespValue::BulkString(bytes) => Ok(Self {
                message: bytes.clone(),
            }),
            _ => Err(CommandError::EchoArgumentNotString),
        }
    }
}

pub fn echo(arguments: &EchoArguments) -> Vec<u8> {
    RespValue::BulkString(arguments.message.clone()).encode()
}

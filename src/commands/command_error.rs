use thiserror::Error;

use crate::resp::RespValue;

/// Client-visible command rejections. Each variant renders as a single
/// `-ERR <message>\r\n` frame; none of them closes the connection.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("commands must be encoded as a list of bulk strings")]
    InvalidRequest,
    #[error("command must be encoded as a bulk string")]
    CommandNameNotBulkString,
    #[error("unsupported command \"{0}\"")]
    UnsupportedCommand(String),
    #[error("\"ECHO\" command requires at least 1 argument")]
    EchoMissingArgument,
    #[error("\"ECHO\" command argument must be a string")]
    EchoArgumentNotString,
    #[error("\"GET\" command requires at least 1 argument")]
    GetMissingArgument,
    #[error("\"GET\" command argument must be a string")]
    GetArgumentNotString,
    #[error("unsupported data type")]
    UnsupportedDataType,
    #[error("\"SET\" command requires at least 2 arguments")]
    SetMissingArguments,
    #[error("\"SET\" command argument must be a string")]
    SetArgumentNotString,
    #[error("\"SET\" command with \"PX\" option requires an expiry value")]
    SetPxMissingExpiry,
    #[error("\"SET\" command \"PX\" option requires an integer expiry value")]
    SetPxInvalidExpiry,
    #[error("\"KEYS\" command requires at least 1 argument")]
    KeysMissingArgument,
    #[error("\"KEYS\" command argument must be a string")]
    KeysArgumentNotString,
    #[error("\"CONFIG\" command must be followed by one of the following subcommands \"GET\", \"HELP\", \"RESETSTAT\", \"REWRITE\" or \"SET\"")]
    ConfigMissingSubcommand,
    #[error("\"CONFIG GET\" command requires at least one argument")]
    ConfigGetMissingArgument,
    #[error("\"CONFIG GET\" argument must be a string")]
    ConfigGetArgumentNotString,
    #[error("\"INFO\" command argument must be a string")]
    InfoArgumentNotString,
    #[error("internal server error")]
    Internal,
}

impl CommandError {
    /// Encodes the error in its wire form.
    pub fn as_bytes(&self) -> Vec<u8> {
        RespValue::Error(format!("ERR {}", self)).encode()
    }
}

use crate::{commands::command_error::CommandError, resp::RespValue, server::RedisServer};

/// Hex form of the minimal empty-database snapshot streamed to a replica
/// that requests a full resynchronization.
const RDB_DUMP: &str = "524544495330303131fa0972656469732d76657205372e322e30fa0a72656469732d62697473c040fa056374696d65c26d08bc65fa08757365642d6d656dc2b0c41000fa08616f662d62617365c000fff06e3bfec0ff5aa2";

/// Replies `+FULLRESYNC <replication id> 0` followed by the snapshot prelude.
///
/// The prelude is `$<len>\r\n<bytes>` with no trailing terminator; syncing
/// replicas read exactly the declared byte count.
pub fn psync(server: &RedisServer) -> Vec<u8> {
    let payload = match hex::decode(RDB_DUMP) {
        Ok(payload) => payload,
        Err(_) => return CommandError::Internal.as_bytes(),
    };

    let mut response =
        RespValue::SimpleString(format!("FULLRESYNC {} 0", server.repl_id)).encode();

    response.extend_from_slice(format!("${}\r\n", payload.len()).as_bytes());
    response.extend_from_slice(&payload);

    response
}

//! A single-node, in-memory key-value server speaking the Redis
//! serialization protocol.
//!
//! The crate provides:
//!
//! - A RESP frame codec over buffered async readers
//! - A snapshot file decoder, including the length encoding and
//!   LZF-compressed string form
//! - A concurrent keyspace with lazy and periodic expiry
//! - A command engine for PING, ECHO, GET, SET, KEYS, CONFIG GET, INFO,
//!   REPLCONF and PSYNC
//! - The connection runtime and the outbound replication handshake
//!
//! Concurrency is task-per-connection on Tokio, with cooperative shutdown
//! through a shared cancellation token.

pub mod commands;
pub mod connection;
pub mod handshake;
pub mod key_value_store;
pub mod rdb;
pub mod resp;
pub mod server;

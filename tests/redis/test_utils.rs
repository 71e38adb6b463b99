use std::sync::Arc;

use tokio::sync::Mutex;

use redis_lite::{
    commands::handle_request,
    key_value_store::KeyValueStore,
    resp::RespValue,
    server::RedisServer,
};

/// A fresh server context plus an empty keyspace for command tests.
pub struct TestEnv {
    pub server: Arc<RedisServer>,
    pub store: Arc<Mutex<KeyValueStore>>,
}

impl TestEnv {
    pub fn new_master_server() -> Self {
        Self::with_args(&[])
    }

    pub fn with_args(args: &[&str]) -> Self {
        let mut full_args = vec!["redis-lite".to_string()];
        full_args.extend(args.iter().map(|arg| arg.to_string()));

        let server = RedisServer::new(full_args).unwrap();

        Self {
            server: Arc::new(server),
            store: Arc::new(Mutex::new(KeyValueStore::new())),
        }
    }

    pub async fn dispatch(&self, input: RespValue) -> Vec<Vec<u8>> {
        handle_request(&input, &self.server, &self.store).await
    }

    /// Dispatches a request that must produce exactly one response.
    pub async fn dispatch_single(&self, input: RespValue) -> Vec<u8> {
        let mut responses = self.dispatch(input).await;

        assert_eq!(responses.len(), 1, "expected exactly one response");
        responses.remove(0)
    }
}

/// Builds a request array of bulk strings from string parts.
pub fn command(parts: &[&str]) -> RespValue {
    RespValue::Array(
        parts
            .iter()
            .map(|part| RespValue::BulkString(part.as_bytes().to_vec()))
            .collect(),
    )
}

pub fn error_response(message: &str) -> Vec<u8> {
    format!("-ERR {}\r\n", message).into_bytes()
}

use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;

use redis_lite::server::RedisServer;

/// Entry point: parse the command line, build the server context and run
/// until a shutdown signal. Startup failures exit with a non-zero status
/// before any traffic is accepted.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => Arc::new(server),
        Err(err) => {
            error!("failed to parse command line arguments: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = server.run().await {
        error!("failed to start server: {}", err);
        std::process::exit(1);
    }
}

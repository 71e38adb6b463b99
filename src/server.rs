//! Server configuration and the main accept loop.
//!
//! The server context is created once from the command line and shared by
//! reference with every task. Startup order: load the snapshot, perform the
//! replication handshake when running as a replica, bind the listener, start
//! the expiry sweeper, then accept connections until the shutdown signal.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use regex::Regex;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::connection::handle_client_connection;
use crate::handshake::{perform_handshake, HandshakeError};
use crate::key_value_store::{run_expiry_sweeper, KeyValueStore, Value};
use crate::rdb::{parse_rdb_file, RdbError};

/// Default interval between expiry sweeps, in milliseconds.
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5000;

/// Errors that can occur during command-line argument parsing.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CliError {
    #[error("Invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("Invalid port flag value")]
    InvalidPortFlagValue,
    #[error("Invalid master address")]
    InvalidMasterAddress,
    #[error("Invalid master port")]
    InvalidMasterPort,
}

/// Errors that abort startup before any traffic is accepted.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to bind TCP listener: {0}")]
    Bind(String),
    #[error("failed to load snapshot file: {0}")]
    SnapshotLoad(#[from] RdbError),
    #[error("failed to install signal handler: {0}")]
    Signal(String),
    #[error("replication handshake failed: {0}")]
    Handshake(#[from] HandshakeError),
}

#[derive(Debug, PartialEq, Clone)]
pub enum RedisRole {
    Master,
    /// A replica connected to a master at the specified (host, port).
    Replica((String, u16)),
}

impl RedisRole {
    /// The role name as reported by `INFO replication`.
    pub fn as_string(&self) -> &str {
        match self {
            RedisRole::Master => "master",
            RedisRole::Replica(_) => "slave",
        }
    }
}

/// Process-wide server context, immutable after creation.
#[derive(Debug, Clone)]
pub struct RedisServer {
    /// The TCP port the server listens on.
    pub port: u16,
    pub role: RedisRole,
    /// 40-character hexadecimal replication id, fixed for the process lifetime.
    pub repl_id: String,
    pub repl_offset: usize,
    /// Configuration entries served by `CONFIG GET`.
    pub config: HashMap<String, String>,
    /// Interval between expiry sweeps, in milliseconds.
    pub sweep_interval_ms: u64,
    /// Shutdown signal shared with every task.
    pub shutdown: CancellationToken,
}

impl RedisServer {
    /// Creates a server context from command-line arguments.
    ///
    /// # Supported Arguments
    ///
    /// * `--port <port>`, `-p <port>` - Port number to listen on (default: 6379)
    /// * `--dir <path>` - Directory containing the snapshot file
    /// * `--dbfilename <name>` - Snapshot file name
    /// * `--replicaof "<host> <port>"` - Start as a replica of the given master
    ///
    /// # Returns
    ///
    /// * `Ok(RedisServer)` - Successfully configured server context
    /// * `Err(CliError)` - If argument parsing fails or invalid values are provided
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut port: Option<u16> = None;
        let mut role = RedisRole::Master;
        let mut dir = String::new();
        let mut dbfilename = String::new();
        let mut replicaof = String::new();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" | "-p" => {
                    let Some(port_str) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    port = Some(validate_port_flag(&port_str)?);
                }
                "--dir" => {
                    let Some(value) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    dir = value;
                }
                "--dbfilename" => {
                    let Some(value) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    dbfilename = value;
                }
                "--replicaof" => {
                    let Some(master_address) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    let (host, master_port) = validate_master_address(&master_address)?;

                    role = RedisRole::Replica((host, master_port));
                    replicaof = master_address;
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        let config = HashMap::from([
            ("dir".to_string(), dir),
            ("dbfilename".to_string(), dbfilename),
            ("replicaof".to_string(), replicaof),
        ]);

        Ok(RedisServer {
            port: port.unwrap_or(6379),
            role,
            repl_id: generate_replication_id(),
            repl_offset: 0,
            config,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            shutdown: CancellationToken::new(),
        })
    }

    /// Runs the server until the shutdown signal fires.
    ///
    /// Returns an error only for startup failures; once the accept loop is
    /// entered the server runs until `SIGINT`/`SIGTERM` cancels the shutdown
    /// token, then returns cleanly.
    pub async fn run(self: Arc<Self>) -> Result<(), StartupError> {
        let store = Arc::new(Mutex::new(KeyValueStore::new()));

        self.load_snapshot(&store).await?;

        if let RedisRole::Replica((host, master_port)) = &self.role {
            perform_handshake(host, *master_port, self.port).await?;
            info!("completed replication handshake with {}:{}", host, master_port);
        }

        let address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|err| StartupError::Bind(err.to_string()))?;

        info!("listening on {}", address);

        self.spawn_signal_watcher()?;

        tokio::spawn(run_expiry_sweeper(
            Arc::clone(&store),
            self.sweep_interval_ms,
            self.shutdown.clone(),
        ));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, _address)) => {
                        let server = Arc::clone(&self);
                        let store = Arc::clone(&store);

                        tokio::spawn(async move {
                            handle_client_connection(stream, server, store).await;
                        });
                    }
                    Err(err) => {
                        warn!("failed to accept connection: {}", err);
                    }
                }
            }
        }

        // Dropping the listener closes the socket after the signal.
        Ok(())
    }

    /// Loads the snapshot at `<dir>/<dbfilename>` when both are configured and
    /// the file exists. Only database 0 is served at runtime; entries from
    /// other databases are skipped.
    async fn load_snapshot(&self, store: &Arc<Mutex<KeyValueStore>>) -> Result<(), StartupError> {
        let dir = self.config.get("dir").map(String::as_str).unwrap_or("");
        let dbfilename = self
            .config
            .get("dbfilename")
            .map(String::as_str)
            .unwrap_or("");

        if dir.is_empty() || dbfilename.is_empty() {
            return Ok(());
        }

        let path = Path::new(dir).join(dbfilename);

        if !path.exists() {
            return Ok(());
        }

        let entries = parse_rdb_file(&path)?;
        let mut store_guard = store.lock().await;
        let mut loaded = 0;

        for entry in entries {
            if entry.database_index != 0 {
                continue;
            }

            store_guard.set(
                entry.key,
                Value {
                    data: entry.value,
                    expiration: entry.expiry,
                },
            );
            loaded += 1;
        }

        info!("loaded {} entries from \"{}\"", loaded, path.display());

        Ok(())
    }

    /// Cancels the shutdown token when `SIGINT` or `SIGTERM` arrives.
    fn spawn_signal_watcher(&self) -> Result<(), StartupError> {
        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|err| StartupError::Signal(err.to_string()))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|err| StartupError::Signal(err.to_string()))?;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => {}
                _ = sigterm.recv() => {}
            }

            info!("shutting down...");
            shutdown.cancel();
        });

        Ok(())
    }
}

fn generate_replication_id() -> String {
    const HEX_DIGITS: &[u8] = b"0123456789abcdef";

    let mut rng = rand::rng();

    (0..40)
        .map(|_| HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char)
        .collect()
}

fn validate_port_flag(port: &str) -> Result<u16, CliError> {
    validate_port_with_error(port, CliError::InvalidPortFlagValue)
}

fn validate_master_port(port: &str) -> Result<u16, CliError> {
    validate_port_with_error(port, CliError::InvalidMasterPort)
}

fn validate_port_with_error(port: &str, error: CliError) -> Result<u16, CliError> {
    let port_number = port.parse::<u16>().map_err(|_| error.clone())?;

    if port_number == 0 {
        return Err(error);
    }

    Ok(port_number)
}

/// Validates a master address of the form `<host> <port>`, where host is an
/// IPv4 address or a hostname.
fn validate_master_address(master_address: &str) -> Result<(String, u16), CliError> {
    let ipv4_regex = Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$")
        .map_err(|_| CliError::InvalidMasterAddress)?;
    let hostname_regex =
        Regex::new(r"^[a-zA-Z0-9\-\.]+$").map_err(|_| CliError::InvalidMasterAddress)?;

    let split_address = master_address.split_whitespace().collect::<Vec<&str>>();

    if split_address.len() != 2 {
        return Err(CliError::InvalidMasterAddress);
    }

    let address = split_address[0];

    let valid_address = if let Some(caps) = ipv4_regex.captures(address) {
        caps.iter().skip(1).all(|octet| {
            octet
                .map(|m| m.as_str().parse::<u16>().map(|v| v <= 255).unwrap_or(false))
                .unwrap_or(false)
        })
    } else {
        hostname_regex.is_match(address)
    };

    if !valid_address {
        return Err(CliError::InvalidMasterAddress);
    }

    let port_number = validate_master_port(split_address[1])?;

    Ok((address.to_string(), port_number))
}

//! The in-memory keyspace.
//!
//! An entry whose expiry is set and strictly before the current instant is
//! logically absent: `get` removes it in band, and the periodic sweeper
//! removes entries nobody reads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::Mutex;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, PartialEq, Clone)]
pub enum DataType {
    String(Vec<u8>),
    List(Vec<Vec<u8>>),
    Set(HashSet<Vec<u8>>),
    Hash(HashMap<Vec<u8>, Vec<u8>>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Value {
    pub data: DataType,
    /// Absolute instant after which the entry is logically absent.
    /// `None` means the entry never expires.
    pub expiration: Option<Timestamp>,
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<Vec<u8>, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Looks up a key, deleting it first if its expiry has passed.
    pub fn get(&mut self, key: &[u8]) -> Option<&Value> {
        if self.remove_if_expired(key, Timestamp::now()) {
            return None;
        }

        self.entries.get(key)
    }

    /// Creates or overwrites an entry.
    pub fn set(&mut self, key: Vec<u8>, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    /// Number of stored entries, including logically expired ones that have
    /// not been swept yet.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// A snapshot of the stored keys, safe to iterate without holding the lock.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.keys().cloned().collect()
    }

    /// Removes the entry if its expiry is set and strictly before `now`.
    /// Returns whether a removal happened.
    pub fn remove_if_expired(&mut self, key: &[u8], now: Timestamp) -> bool {
        let expired = match self.entries.get(key) {
            Some(value) => matches!(value.expiration, Some(expiration) if expiration < now),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
        }

        expired
    }
}

/// Periodically removes expired entries until the shutdown signal fires.
///
/// Each sweep takes a snapshot of the keys and re-acquires the store lock per
/// entry, so concurrent readers are never blocked for a whole pass.
pub async fn run_expiry_sweeper(
    store: Arc<Mutex<KeyValueStore>>,
    interval_ms: u64,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(Duration::from_millis(interval_ms));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                let keys = store.lock().await.keys();
                let now = Timestamp::now();
                let mut removed = 0;

                for key in keys {
                    if store.lock().await.remove_if_expired(&key, now) {
                        removed += 1;
                    }
                }

                if removed > 0 {
                    debug!("removed {} expired keys", removed);
                }
            }
        }
    }
}

//! Short-lived forecast cache over a narrow key-value store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForecastError, StoreError};

/// Default freshness window: 10 minutes.
pub const DEFAULT_TTL_MILLIS: i64 = 10 * 60 * 1000;

/// Minimal persistent key-value interface the cache is written against.
pub trait KeyValueStore: Send + Sync {
    /// Stored value, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Stored cache entry: `{ "ts": <epoch ms>, "data": <response body> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedForecast {
    pub ts: i64,
    pub data: Value,
}

impl CachedForecast {
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.ts)
    }
}

/// The last successful forecast response, kept under one fixed key.
#[derive(Debug)]
pub struct ForecastCache<S, C = SystemClock> {
    store: S,
    clock: C,
    key: String,
    ttl_millis: i64,
}

impl<S: KeyValueStore> ForecastCache<S, SystemClock> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self::with_clock(store, key, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> ForecastCache<S, C> {
    pub fn with_clock(store: S, key: impl Into<String>, clock: C) -> Self {
        Self {
            store,
            clock,
            key: key.into(),
            ttl_millis: DEFAULT_TTL_MILLIS,
        }
    }

    pub fn with_ttl_millis(mut self, ttl_millis: i64) -> Self {
        self.ttl_millis = ttl_millis;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Entry as stored, regardless of age.
    pub fn read(&self) -> Result<CachedForecast, ForecastError> {
        let raw = self
            .store
            .get(&self.key)
            .ok_or_else(|| ForecastError::CacheRead(format!("no entry under {}", self.key)))?;
        serde_json::from_str(&raw).map_err(|e| ForecastError::CacheRead(e.to_string()))
    }

    /// Payload of an entry younger than the TTL. Missing, corrupt and stale
    /// entries are all a miss.
    pub fn load_fresh(&self) -> Option<Value> {
        let entry = match self.read() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Forecast cache miss: {}", e);
                return None;
            }
        };

        let age = entry.age_millis(self.clock.now_millis());
        if age < self.ttl_millis {
            tracing::debug!("Forecast cache hit ({} ms old)", age);
            Some(entry.data)
        } else {
            tracing::debug!("Forecast cache stale ({} ms old)", age);
            None
        }
    }

    /// Overwrite the entry with `data` stamped at the current time.
    pub fn write(&self, data: &Value) -> Result<(), ForecastError> {
        let entry = CachedForecast {
            ts: self.clock.now_millis(),
            data: data.clone(),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| StoreError::Rejected(e.to_string()))?;
        self.store.set(&self.key, &raw)?;
        Ok(())
    }
}

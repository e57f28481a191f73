//! Tiered key-value storage for limiter state.
//!
//! Every medium implements [`KvBackend`] over decimal strings. [`TierStore`]
//! wraps a backend into a [`Store`], which never fails: unavailable media read
//! as absent and drop writes, and malformed values read as absent.

mod config;
mod durable;
mod memory;
mod volatile;

pub use config::{Config, LimiterConfig};
pub use durable::SqliteKv;
pub use memory::{MemoryKv, UnavailableKv};
pub use volatile::SessionFileKv;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

use crate::error::StoreError;

/// Storage keys. Values are integers encoded as decimal strings.
pub mod keys {
    pub const SCROLL_COUNT: &str = "scrollCount";
    pub const FIRST_SCROLL_TIME: &str = "firstScrollTime";
    pub const LAST_ACTIVITY_TIME: &str = "lastActivityTime";
    pub const BLOCK_UNTIL: &str = "blockUntil";
}

/// Storage scope, in read-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Survives browser restarts.
    Durable,
    /// Scoped to one tab/session.
    Volatile,
    /// In-process only; lost on reload.
    Memory,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Durable, Tier::Volatile, Tier::Memory];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Durable => "durable",
            Tier::Volatile => "volatile",
            Tier::Memory => "memory",
        }
    }

    /// Whether activity counters are kept in this tier.
    ///
    /// Counters are session-scoped; only the lockout reaches the durable tier.
    pub fn holds_counters(self) -> bool {
        matches!(self, Tier::Volatile | Tier::Memory)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw storage medium.
pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Uniform integer store over one tier. Infallible from the caller's side.
pub trait Store {
    fn tier(&self) -> Tier;
    fn read(&self, key: &str) -> Option<u64>;
    fn write(&mut self, key: &str, value: u64);
    fn delete(&mut self, key: &str);
}

/// Adapts a [`KvBackend`] to the [`Store`] contract.
pub struct TierStore<B> {
    tier: Tier,
    backend: B,
}

impl<B: KvBackend> TierStore<B> {
    pub fn new(tier: Tier, backend: B) -> Self {
        Self { tier, backend }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn try_read(&self, key: &str) -> Result<Option<u64>, StoreError> {
        match self.backend.get(key)? {
            None => Ok(None),
            Some(raw) => parse_stored(key, &raw).map(Some),
        }
    }
}

impl<B: KvBackend> Store for TierStore<B> {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn read(&self, key: &str) -> Option<u64> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(tier = %self.tier, key, "read degraded to absent: {e}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: u64) {
        if let Err(e) = self.backend.set(key, &value.to_string()) {
            warn!(tier = %self.tier, key, "write dropped: {e}");
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!(tier = %self.tier, key, "delete dropped: {e}");
        }
    }
}

/// Strict decimal parse. Signs, fractions and trailing garbage are rejected.
fn parse_stored(key: &str, raw: &str) -> Result<u64, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::Malformed {
            key: key.to_string(),
            value: raw.to_string(),
        });
    }
    trimmed.parse::<u64>().map_err(|_| StoreError::Malformed {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Returns `~/.config/scrollgate[-dev]/` based on SCROLLGATE_ENV.
///
/// Set SCROLLGATE_ENV=dev to use the development data directory, or
/// SCROLLGATE_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("SCROLLGATE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SCROLLGATE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("scrollgate-dev")
            } else {
                base_dir.join("scrollgate")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! Core error types for scrollgate-core.
//!
//! Storage errors never reach callers of the limiter: the tier adapters absorb
//! them. The fallible surface is limited to opening backends and loading
//! configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::Tier;

/// Core error type for scrollgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage backend errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a raw key-value backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The medium threw, is disabled, or is over quota.
    #[error("{tier} storage unavailable: {message}")]
    Unavailable { tier: Tier, message: String },

    /// A stored value is not a non-negative decimal integer.
    #[error("Malformed value for '{key}': {value:?}")]
    Malformed { key: String, value: String },
}

impl StoreError {
    pub fn unavailable(tier: Tier, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            tier,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::unavailable(Tier::Durable, err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

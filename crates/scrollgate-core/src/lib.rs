//! # Scrollgate Core Library
//!
//! This library provides the decision core of Scrollgate, a scroll limiter
//! for one designated page. It counts scrolls, locks the page once a ceiling
//! is exceeded, and starts a fresh counting window after inactivity.
//!
//! ## Architecture
//!
//! - **Limiter**: A wall-clock state machine; the caller feeds inputs and
//!   periodically invokes `tick()`
//! - **Storage**: Tiered key-value stores (SQLite durable tier, per-session
//!   volatile tier, in-process memory fallback) behind one infallible contract
//! - **Gate**: Route matching that decides whether the limiter activates
//! - **Config**: TOML-based thresholds and gate settings
//!
//! ## Key Components
//!
//! - [`ScrollLimiter`]: Core state machine
//! - [`Store`]: Uniform per-tier storage contract
//! - [`Snapshot`]: Read-only view polled by the presentation layer
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod gate;
pub mod limiter;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use gate::PageGate;
pub use limiter::{format_countdown, run_driver, InputKind, LimiterState, ScrollLimiter, Snapshot};
pub use storage::{Config, LimiterConfig, SessionFileKv, SqliteKv, Store, Tier};

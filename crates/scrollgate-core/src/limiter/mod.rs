mod driver;
mod machine;
mod snapshot;

pub use driver::run_driver;
pub use machine::{InputKind, ScrollLimiter};
pub use snapshot::{format_countdown, LimiterState, Snapshot};

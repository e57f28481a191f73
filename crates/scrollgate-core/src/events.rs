use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State changes produced by the limiter.
/// Consumers log or print them; rendering polls the snapshot instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ScrollCounted {
        count: u32,
        ceiling: u32,
        at: DateTime<Utc>,
    },
    /// Ceiling exceeded; the page is blocked until `until`.
    LockoutStarted {
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A lockout window passed and a fresh counting window began.
    LockoutExpired {
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Idle threshold reached; counters cleared.
    WindowReset {
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let at = DateTime::<Utc>::from_timestamp_millis(0).unwrap();
        let json = serde_json::to_value(Event::WindowReset { at }).unwrap();
        assert_eq!(json["type"], "window_reset");

        let json = serde_json::to_value(Event::ScrollCounted {
            count: 3,
            ceiling: 150,
            at,
        })
        .unwrap();
        assert_eq!(json["type"], "scroll_counted");
        assert_eq!(json["count"], 3);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimiterState {
    /// Below the ceiling, counting scrolls.
    Counting,
    /// Lockout active; scrolls are ignored.
    Locked,
}

/// Point-in-time view of the limiter for the presentation layer.
///
/// `lockout_until_ms` is 0 when not locked. All times are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: LimiterState,
    pub activity_count: u32,
    pub ceiling: u32,
    pub lockout_until_ms: u64,
    pub first_activity_ms: Option<u64>,
    pub last_activity_ms: Option<u64>,
    pub taken_at_ms: u64,
}

impl Snapshot {
    pub fn is_locked(&self) -> bool {
        self.state == LimiterState::Locked
    }

    /// Progress toward the ceiling, 0..=100.
    pub fn progress_pct(&self) -> u32 {
        if self.ceiling == 0 {
            return 100;
        }
        let pct = u64::from(self.activity_count) * 100 / u64::from(self.ceiling);
        pct.min(100) as u32
    }

    /// Time spent in the current counting window.
    pub fn elapsed_in_window_ms(&self) -> u64 {
        self.first_activity_ms
            .map(|first| self.taken_at_ms.saturating_sub(first))
            .unwrap_or(0)
    }

    pub fn lockout_remaining_ms(&self) -> u64 {
        self.lockout_until_ms.saturating_sub(self.taken_at_ms)
    }
}

/// Render a duration as `m:ss`, rounding down to whole seconds.
pub fn format_countdown(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

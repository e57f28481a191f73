//! Scroll limiter state machine.
//!
//! The limiter is a wall-clock state machine with no internal timers. Input
//! handlers call [`ScrollLimiter::handle_input`]; a background loop calls
//! [`ScrollLimiter::tick`] about once a minute.
//!
//! ## State Transitions
//!
//! ```text
//! Counting --(count > ceiling)--> Locked --(now >= lockout end)--> Counting
//!     ^                                                              |
//!     +------------------(idle >= threshold: fresh window)-----------+
//! ```
//!
//! ## Storage
//!
//! State lives in an ordered list of tiers (durable, volatile, memory). The
//! lockout end is written to every tier and read back from the first tier
//! holding a live value. Counters live in the session-scoped tiers only.

use tracing::{debug, info};

use super::snapshot::{LimiterState, Snapshot};
use crate::clock::{to_datetime, Clock, SystemClock};
use crate::events::Event;
use crate::storage::{keys, KvBackend, LimiterConfig, MemoryKv, Store, Tier, TierStore};

/// A qualifying raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Scroll,
    PointerMove,
    KeyPress,
}

impl std::str::FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scroll" | "wheel" => Ok(InputKind::Scroll),
            "move" | "mousemove" | "pointer" => Ok(InputKind::PointerMove),
            "key" | "keydown" => Ok(InputKind::KeyPress),
            other => Err(format!("unknown input kind: {other}")),
        }
    }
}

/// Rate-limit state machine over tiered storage.
pub struct ScrollLimiter<C = SystemClock> {
    config: LimiterConfig,
    clock: C,
    /// Sorted by read precedence.
    tiers: Vec<Box<dyn Store>>,
    /// When the last counted scroll was accepted. Process-local.
    last_accepted_scroll_ms: Option<u64>,
}

impl<C: Clock> ScrollLimiter<C> {
    /// Build a limiter over a durable and a volatile backend. The memory
    /// fallback tier is added automatically.
    pub fn new<D, V>(config: LimiterConfig, clock: C, durable: D, volatile: V) -> Self
    where
        D: KvBackend + 'static,
        V: KvBackend + 'static,
    {
        let tiers: Vec<Box<dyn Store>> = vec![
            Box::new(TierStore::new(Tier::Durable, durable)),
            Box::new(TierStore::new(Tier::Volatile, volatile)),
            Box::new(TierStore::new(Tier::Memory, MemoryKv::new())),
        ];
        Self::from_stores(config, clock, tiers)
    }

    /// Build a limiter whose every tier is an in-process map.
    pub fn in_memory(config: LimiterConfig, clock: C) -> Self {
        Self::new(config, clock, MemoryKv::new(), MemoryKv::new())
    }

    /// Build a limiter from arbitrary stores; they are consulted by tier order.
    pub fn from_stores(config: LimiterConfig, clock: C, mut tiers: Vec<Box<dyn Store>>) -> Self {
        tiers.sort_by_key(|store| store.tier());
        Self {
            config,
            clock,
            tiers,
            last_accepted_scroll_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Direct access to one tier, bypassing the limiter.
    pub fn store_mut(&mut self, tier: Tier) -> Option<&mut (dyn Store + 'static)> {
        self.tiers
            .iter_mut()
            .find(|store| store.tier() == tier)
            .map(|store| store.as_mut())
    }

    pub fn activity_count(&self) -> u32 {
        self.read_counter(keys::SCROLL_COUNT)
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    pub fn first_activity_ms(&self) -> Option<u64> {
        self.read_counter(keys::FIRST_SCROLL_TIME)
    }

    pub fn last_activity_ms(&self) -> Option<u64> {
        self.read_counter(keys::LAST_ACTIVITY_TIME)
    }

    /// Active lockout end in epoch ms, or 0 when not locked.
    ///
    /// Tiers are read in precedence order and the first value strictly in the
    /// future wins. Values at or before now are purged from their tier. When
    /// only purged values were found, the lockout has just expired and a fresh
    /// counting window begins.
    pub fn lockout_until(&mut self) -> u64 {
        self.check_lockout().0
    }

    /// Read-only view for the presentation layer. Observes lockout expiry first.
    pub fn snapshot(&mut self) -> Snapshot {
        let lockout_until_ms = self.lockout_until();
        Snapshot {
            state: if lockout_until_ms > 0 {
                LimiterState::Locked
            } else {
                LimiterState::Counting
            },
            activity_count: self.activity_count(),
            ceiling: self.config.ceiling,
            lockout_until_ms,
            first_activity_ms: self.first_activity_ms(),
            last_activity_ms: self.last_activity_ms(),
            taken_at_ms: self.clock.now_ms(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Mark the user as active now. Drives idle detection only.
    pub fn record_activity(&mut self) {
        let now = self.clock.now_ms();
        self.write_counter(keys::LAST_ACTIVITY_TIME, now);
    }

    /// Dispatch one raw input. Every input counts as activity; scrolls are
    /// also offered to [`ScrollLimiter::register_scroll`].
    pub fn handle_input(&mut self, kind: InputKind) -> Option<Event> {
        self.record_activity();
        match kind {
            InputKind::Scroll => self.register_scroll(),
            InputKind::PointerMove | InputKind::KeyPress => None,
        }
    }

    /// Count one scroll, subject to lockout and debounce.
    ///
    /// Returns `None` when the scroll is ignored: the page is locked, or the
    /// previous accepted scroll was less than `debounce_ms` ago.
    pub fn register_scroll(&mut self) -> Option<Event> {
        if self.lockout_until() > 0 {
            return None;
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.last_accepted_scroll_ms {
            // A clock that moved backwards does not hold the debounce shut.
            if now >= last && now - last < self.config.debounce_ms {
                return None;
            }
        }
        self.last_accepted_scroll_ms = Some(now);

        self.record_activity();
        let count = self.activity_count().saturating_add(1);
        self.write_counter(keys::SCROLL_COUNT, u64::from(count));
        if self.first_activity_ms().is_none() {
            self.write_counter(keys::FIRST_SCROLL_TIME, now);
        }

        if count > self.config.ceiling {
            let until = now.saturating_add(self.config.lockout_ms());
            for store in &mut self.tiers {
                store.write(keys::BLOCK_UNTIL, until);
            }
            info!(count, ceiling = self.config.ceiling, until, "scroll ceiling exceeded, locking");
            return Some(Event::LockoutStarted {
                until: to_datetime(until),
                at: to_datetime(now),
            });
        }

        debug!(count, ceiling = self.config.ceiling, "scroll counted");
        Some(Event::ScrollCounted {
            count,
            ceiling: self.config.ceiling,
            at: to_datetime(now),
        })
    }

    /// Start a fresh counting window once the user has been idle long enough.
    ///
    /// A no-op while locked, before the idle threshold, and when the window
    /// is already fresh: zero count and no activity since it opened.
    pub fn tick_idle_check(&mut self) -> Option<Event> {
        if self.lockout_until() > 0 {
            return None;
        }

        let now = self.clock.now_ms();
        let last = self.last_activity_ms().unwrap_or(0);
        if now.saturating_sub(last) < self.config.idle_reset_ms() {
            return None;
        }
        if self.activity_count() == 0 && self.window_opened_after(self.last_activity_ms()) {
            return None;
        }

        self.delete_counter(keys::SCROLL_COUNT);
        self.write_counter(keys::FIRST_SCROLL_TIME, now);
        info!(idle_ms = now.saturating_sub(last), "idle threshold reached, counting window reset");
        Some(Event::WindowReset { at: to_datetime(now) })
    }

    /// Drop the lockout and begin a fresh counting window.
    pub fn clear_lockout(&mut self) {
        for store in &mut self.tiers {
            store.delete(keys::BLOCK_UNTIL);
        }
        self.delete_counter(keys::SCROLL_COUNT);
        self.delete_counter(keys::FIRST_SCROLL_TIME);
    }

    /// Background tick: observe lockout expiry, then run the idle check.
    pub fn tick(&mut self) -> Vec<Event> {
        let (_, expired) = self.check_lockout();
        expired.into_iter().chain(self.tick_idle_check()).collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn check_lockout(&mut self) -> (u64, Option<Event>) {
        let now = self.clock.now_ms();
        let mut stale: Option<u64> = None;

        for store in &mut self.tiers {
            match store.read(keys::BLOCK_UNTIL) {
                Some(until) if until > now => return (until, None),
                Some(0) => store.delete(keys::BLOCK_UNTIL),
                Some(until) => {
                    debug!(tier = %store.tier(), until, "purging stale lockout");
                    store.delete(keys::BLOCK_UNTIL);
                    stale = Some(stale.map_or(until, |s| s.max(until)));
                }
                None => {}
            }
        }

        match stale {
            Some(until) => {
                self.clear_lockout();
                info!(until, "lockout expired, counting window reset");
                (
                    0,
                    Some(Event::LockoutExpired {
                        until: to_datetime(until),
                        at: to_datetime(now),
                    }),
                )
            }
            None => (0, None),
        }
    }

    fn window_opened_after(&self, last_activity: Option<u64>) -> bool {
        match (self.first_activity_ms(), last_activity) {
            (Some(first), Some(last)) => first >= last,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn read_counter(&self, key: &str) -> Option<u64> {
        self.tiers
            .iter()
            .filter(|store| store.tier().holds_counters())
            .find_map(|store| store.read(key))
    }

    fn write_counter(&mut self, key: &str, value: u64) {
        for store in self.tiers.iter_mut().filter(|s| s.tier().holds_counters()) {
            store.write(key, value);
        }
    }

    fn delete_counter(&mut self, key: &str) {
        for store in self.tiers.iter_mut().filter(|s| s.tier().holds_counters()) {
            store.delete(key);
        }
    }
}

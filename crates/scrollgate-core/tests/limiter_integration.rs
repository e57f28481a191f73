//! Integration tests for the scroll limiter over real storage backends.
//!
//! These tests drive the limiter on a virtual clock through full lockout
//! cycles, page reloads and out-of-band storage changes.

use scrollgate_core::storage::{keys, KvBackend, UnavailableKv};
use scrollgate_core::{
    Clock, Event, LimiterConfig, LimiterState, ManualClock, ScrollLimiter, SessionFileKv, SqliteKv, Tier,
};

const T0: u64 = 1_700_000_000_000;
const FIFTEEN_MIN: u64 = 15 * 60_000;

fn spaced(limiter: &mut ScrollLimiter<ManualClock>, clock: &ManualClock, n: u32) {
    for _ in 0..n {
        clock.advance(300);
        limiter.register_scroll();
    }
}

fn open_page(
    dir: &std::path::Path,
    session: &str,
    clock: &ManualClock,
) -> ScrollLimiter<ManualClock> {
    let durable = SqliteKv::open(&dir.join("durable.db")).unwrap();
    let volatile = SessionFileKv::open_in(&dir.join("sessions"), session).unwrap();
    ScrollLimiter::new(LimiterConfig::default(), clock.clone(), durable, volatile)
}

#[test]
fn scenario_a_ceiling_then_lockout() {
    let clock = ManualClock::new(T0);
    let mut limiter = ScrollLimiter::in_memory(LimiterConfig::default(), clock.clone());

    spaced(&mut limiter, &clock, 150);
    let snap = limiter.snapshot();
    assert_eq!(snap.state, LimiterState::Counting);
    assert_eq!(snap.activity_count, 150);
    assert_eq!(snap.lockout_until_ms, 0);

    clock.advance(300);
    let event = limiter.register_scroll();
    assert!(matches!(event, Some(Event::LockoutStarted { .. })));
    let snap = limiter.snapshot();
    assert_eq!(snap.state, LimiterState::Locked);
    assert_eq!(snap.lockout_until_ms, clock.now_ms() + FIFTEEN_MIN);
}

#[test]
fn scenario_b_expiry_unlocks_and_resets() {
    let clock = ManualClock::new(T0);
    let mut limiter = ScrollLimiter::in_memory(LimiterConfig::default(), clock.clone());
    spaced(&mut limiter, &clock, 151);
    let until = limiter.lockout_until();
    assert_eq!(until, clock.now_ms() + FIFTEEN_MIN);

    clock.set(until + 1_000);
    let snap = limiter.snapshot();
    assert_eq!(snap.state, LimiterState::Counting);
    assert_eq!(snap.lockout_until_ms, 0);
    assert_eq!(snap.activity_count, 0);
}

#[test]
fn scenario_c_burst_counts_once() {
    let clock = ManualClock::new(T0);
    let mut limiter = ScrollLimiter::in_memory(LimiterConfig::default(), clock.clone());

    for i in 0..200u64 {
        clock.set(T0 + i * 50 / 200);
        limiter.register_scroll();
    }
    assert_eq!(limiter.activity_count(), 1);
}

#[test]
fn scenario_d_idle_resets_count() {
    let clock = ManualClock::new(T0);
    let mut limiter = ScrollLimiter::in_memory(LimiterConfig::default(), clock.clone());
    spaced(&mut limiter, &clock, 80);
    assert_eq!(limiter.activity_count(), 80);

    clock.advance(10 * 60_000);
    let events = limiter.tick();
    assert!(events.iter().any(|e| matches!(e, Event::WindowReset { .. })));
    assert_eq!(limiter.activity_count(), 0);
    assert_eq!(limiter.first_activity_ms(), Some(clock.now_ms()));
}

#[test]
fn lockout_survives_reload_in_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);

    let until = {
        let mut page = open_page(dir.path(), "tab-1", &clock);
        spaced(&mut page, &clock, 151);
        page.lockout_until()
    };
    assert!(until > clock.now_ms());

    // New tab: fresh volatile tier and memory, same durable tier.
    let mut page = open_page(dir.path(), "tab-2", &clock);
    assert_eq!(page.activity_count(), 0);
    assert_eq!(page.lockout_until(), until);
    clock.advance(300);
    assert!(page.register_scroll().is_none());

    clock.set(until);
    let snap = page.snapshot();
    assert_eq!(snap.state, LimiterState::Counting);

    let durable = SqliteKv::open(&dir.path().join("durable.db")).unwrap();
    assert_eq!(durable.get(keys::BLOCK_UNTIL).unwrap(), None);
}

#[test]
fn counters_survive_reload_in_same_session() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);
    {
        let mut page = open_page(dir.path(), "tab-1", &clock);
        spaced(&mut page, &clock, 12);
    }
    let page = open_page(dir.path(), "tab-1", &clock);
    assert_eq!(page.activity_count(), 12);

    let other = open_page(dir.path(), "tab-2", &clock);
    assert_eq!(other.activity_count(), 0);
}

#[test]
fn durable_cleared_out_of_band_still_locked() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);
    let mut page = open_page(dir.path(), "tab-1", &clock);
    spaced(&mut page, &clock, 151);
    let until = page.lockout_until();

    let mut other_connection = SqliteKv::open(&dir.path().join("durable.db")).unwrap();
    other_connection.remove(keys::BLOCK_UNTIL).unwrap();

    assert_eq!(page.lockout_until(), until);
    assert!(page.snapshot().is_locked());
}

#[test]
fn malformed_durable_value_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);
    let mut raw = SqliteKv::open(&dir.path().join("durable.db")).unwrap();
    raw.set(keys::BLOCK_UNTIL, "tomorrow").unwrap();

    let mut page = open_page(dir.path(), "tab-1", &clock);
    let snap = page.snapshot();
    assert_eq!(snap.state, LimiterState::Counting);
    assert_eq!(snap.lockout_until_ms, 0);
}

#[test]
fn disabled_storage_keeps_lockout_for_page_lifetime() {
    let clock = ManualClock::new(T0);
    let mut page = ScrollLimiter::new(
        LimiterConfig::default(),
        clock.clone(),
        UnavailableKv::new(Tier::Durable),
        UnavailableKv::new(Tier::Volatile),
    );
    spaced(&mut page, &clock, 151);
    assert!(page.snapshot().is_locked());

    // A reload loses the memory tier, and with it the lockout.
    let mut reloaded = ScrollLimiter::new(
        LimiterConfig::default(),
        clock.clone(),
        UnavailableKv::new(Tier::Durable),
        UnavailableKv::new(Tier::Volatile),
    );
    assert!(!reloaded.snapshot().is_locked());
}

#[test]
fn expired_lockout_from_previous_visit_is_purged_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);
    let mut raw = SqliteKv::open(&dir.path().join("durable.db")).unwrap();
    raw.set(keys::BLOCK_UNTIL, &(T0 - 1).to_string()).unwrap();

    let mut page = open_page(dir.path(), "tab-1", &clock);
    let events = page.tick();
    assert!(matches!(events.first(), Some(Event::LockoutExpired { .. })));
    assert_eq!(raw.get(keys::BLOCK_UNTIL).unwrap(), None);
}

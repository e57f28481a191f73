//! Commands that act on the page limiter. Each invocation is one page load.

use scrollgate_core::storage::{MemoryKv, TierStore, UnavailableKv};
use scrollgate_core::{
    format_countdown, Config, InputKind, ScrollLimiter, SessionFileKv, Snapshot, SqliteKv, Store,
    SystemClock, Tier,
};
use tracing::warn;

/// Build the limiter for `session`. A backend that cannot be opened is
/// replaced by a disabled one so the page still works from lower tiers.
pub fn open_page(session: &str) -> Result<ScrollLimiter, Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let durable: Box<dyn Store> = match SqliteKv::open_default() {
        Ok(kv) => Box::new(TierStore::new(Tier::Durable, kv)),
        Err(e) => {
            warn!("durable storage disabled: {e}");
            Box::new(TierStore::new(Tier::Durable, UnavailableKv::new(Tier::Durable)))
        }
    };
    let volatile: Box<dyn Store> = match SessionFileKv::open_session(session) {
        Ok(kv) => Box::new(TierStore::new(Tier::Volatile, kv)),
        Err(e) => {
            warn!(session, "volatile storage disabled: {e}");
            Box::new(TierStore::new(Tier::Volatile, UnavailableKv::new(Tier::Volatile)))
        }
    };
    let memory: Box<dyn Store> = Box::new(TierStore::new(Tier::Memory, MemoryKv::new()));

    Ok(ScrollLimiter::from_stores(
        config.limiter,
        SystemClock,
        vec![durable, volatile, memory],
    ))
}

/// Snapshot plus the derived fields a progress widget or block screen shows.
pub fn status_json(snapshot: &Snapshot) -> Result<serde_json::Value, serde_json::Error> {
    let mut json = serde_json::to_value(snapshot)?;
    if let Some(obj) = json.as_object_mut() {
        obj.insert("progress_pct".into(), snapshot.progress_pct().into());
        obj.insert(
            "time_in_window".into(),
            format_countdown(snapshot.elapsed_in_window_ms()).into(),
        );
        if snapshot.is_locked() {
            obj.insert(
                "lockout_remaining".into(),
                format_countdown(snapshot.lockout_remaining_ms()).into(),
            );
        }
    }
    Ok(json)
}

pub fn input(session: &str, kind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind: InputKind = kind.parse()?;
    let mut limiter = open_page(session)?;

    match limiter.handle_input(kind) {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("{{\"type\": \"ignored\"}}"),
    }
    Ok(())
}

pub fn status(session: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut limiter = open_page(session)?;
    let snapshot = limiter.snapshot();
    println!("{}", serde_json::to_string_pretty(&status_json(&snapshot)?)?);
    Ok(())
}

pub fn tick(session: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut limiter = open_page(session)?;
    let events = limiter.tick();
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

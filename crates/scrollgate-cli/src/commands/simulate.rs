use clap::Args;
use scrollgate_core::{Clock, Config, Event, ManualClock, ScrollLimiter, SystemClock};

use super::page::status_json;

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of scroll events to deliver
    #[arg(long)]
    scrolls: u32,
    /// Milliseconds between consecutive scrolls
    #[arg(long, default_value = "300")]
    spacing_ms: u64,
    /// Minutes to stay idle after the last scroll before a final tick
    #[arg(long)]
    idle_minutes: Option<u64>,
    /// Override the configured ceiling
    #[arg(long)]
    ceiling: Option<u32>,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut limiter_config = Config::load()?.limiter;
    if let Some(ceiling) = args.ceiling {
        limiter_config.ceiling = ceiling;
    }
    limiter_config.validate()?;

    let clock = ManualClock::new(SystemClock.now_ms());
    let mut limiter = ScrollLimiter::in_memory(limiter_config, clock.clone());

    let mut counted = 0u32;
    let mut lockouts = 0u32;
    let mut ignored = 0u32;
    for i in 0..args.scrolls {
        if i > 0 {
            clock.advance(args.spacing_ms);
        }
        match limiter.handle_input(scrollgate_core::InputKind::Scroll) {
            Some(Event::ScrollCounted { .. }) => counted += 1,
            Some(Event::LockoutStarted { .. }) => {
                counted += 1;
                lockouts += 1;
            }
            _ => ignored += 1,
        }
    }

    let mut tick_events = Vec::new();
    if let Some(minutes) = args.idle_minutes {
        clock.advance(minutes.saturating_mul(60_000));
        tick_events = limiter.tick();
    }

    let snapshot = limiter.snapshot();
    let report = serde_json::json!({
        "counted": counted,
        "ignored": ignored,
        "lockouts": lockouts,
        "tick_events": tick_events,
        "snapshot": status_json(&snapshot)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

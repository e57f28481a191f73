//! Event loop that owns a limiter for the lifetime of a page.
//!
//! Inputs and the periodic tick are multiplexed on one task, so every limiter
//! operation runs to completion before the next one starts.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::machine::{InputKind, ScrollLimiter};
use crate::clock::Clock;
use crate::events::Event;

/// Feed `inputs` into `limiter` and call [`ScrollLimiter::tick`] every
/// `tick_every`, handing each resulting event to `on_event`.
///
/// Returns when the input channel closes.
pub async fn run_driver<C, F>(
    limiter: &mut ScrollLimiter<C>,
    mut inputs: mpsc::Receiver<InputKind>,
    tick_every: Duration,
    mut on_event: F,
) where
    C: Clock,
    F: FnMut(Event),
{
    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the page-load check runs below instead.
    ticker.tick().await;

    info!(tick_secs = tick_every.as_secs(), "limiter driver started");
    for event in limiter.tick() {
        on_event(event);
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for event in limiter.tick() {
                    on_event(event);
                }
            }
            input = inputs.recv() => match input {
                Some(kind) => {
                    debug!(?kind, "input");
                    if let Some(event) = limiter.handle_input(kind) {
                        on_event(event);
                    }
                }
                None => break,
            },
        }
    }

    info!("limiter driver stopped");
}

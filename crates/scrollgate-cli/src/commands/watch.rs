use std::time::Duration;

use scrollgate_core::{run_driver, InputKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use super::page::open_page;

/// Keep one page open: stdin lines are inputs, ticks run on the configured
/// interval. Events are printed as JSON lines. Ends at EOF.
pub fn run(session: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut limiter = open_page(session)?;
    let tick_every = Duration::from_secs(limiter.config().idle_check_interval_secs);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (tx, rx) = mpsc::channel::<InputKind>(64);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<InputKind>() {
                    Ok(kind) => {
                        if tx.send(kind).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                }
            }
        });

        run_driver(&mut limiter, rx, tick_every, |event| {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("failed to encode event: {e}"),
            }
        })
        .await;
    });

    Ok(())
}

//! trigger-worker — single-process trigger scheduler.
//!
//! Wires the tick engine against the in-memory store stack and runs the
//! delayed-signal loop: due `AdvanceClock` signals drive tick cycles,
//! `TriggerFired` signals are logged as delivered. A deployment with real
//! infrastructure swaps the memory ports for durable ones.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use metronome_core::config::{self, Config};
use metronome_core::Signal;
use metronome_store::{MemoryCursor, MemoryLedger, MemoryOutbox, SignalSender};
use metronome_worker::TriggerWorker;

// ── CLI ─────────────────────────────────────────────────────────────

/// Metronome trigger worker — self-advancing cron trigger scheduler.
#[derive(Parser, Debug)]
#[command(name = "trigger-worker", version, about)]
struct Cli {
    /// Signal poll interval in milliseconds (overrides config).
    #[arg(long, env = "METRONOME_POLL_INTERVAL_MS")]
    poll_interval: Option<u64>,

    /// Redelivery back-off after a failed tick cycle, in milliseconds.
    #[arg(long, env = "METRONOME_RETRY_DELAY_MS")]
    retry_delay: Option<u64>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();

    let poll_interval =
        Duration::from_millis(cli.poll_interval.unwrap_or(config.worker.poll_interval_ms));
    let retry_delay =
        Duration::from_millis(cli.retry_delay.unwrap_or(config.worker.retry_delay_ms));

    let outbox = Arc::new(MemoryOutbox::new());
    let ledger = Arc::new(MemoryLedger::new(outbox.clone()));
    let cursor = Arc::new(MemoryCursor::new());
    let worker = TriggerWorker::new(ledger, cursor, outbox.clone());

    worker.init_clock().await?;
    info!("trigger-worker started");

    let mut interval = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = interval.tick() => {
                while let Some(signal) = outbox.pop_due(Utc::now()).await {
                    dispatch(&worker, &outbox, signal, retry_delay).await;
                }
            }
        }
    }

    info!("trigger-worker exited cleanly");
    Ok(())
}

/// Handle one due signal. Tick-cycle failures are invisible to callers;
/// the signal is redelivered after a back-off instead.
async fn dispatch(
    worker: &TriggerWorker,
    outbox: &MemoryOutbox,
    signal: Signal,
    retry_delay: Duration,
) {
    match signal {
        Signal::AdvanceClock(tick) => {
            if let Err(e) = worker.advance_tick(tick.last_tick).await {
                warn!(
                    error = %e,
                    last_tick = %tick.last_tick,
                    "tick cycle failed, redelivering"
                );
                if let Err(e) = outbox
                    .send_delayed(Signal::AdvanceClock(tick), retry_delay)
                    .await
                {
                    error!(error = %e, "failed to redeliver tick signal");
                }
            }
        }
        Signal::TriggerFired(fired) => {
            info!(
                reply_to = %fired.reply.reply_to,
                tick_time = %fired.tick_time,
                "trigger fired signal delivered"
            );
        }
    }
}

use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub worker: WorkerConfig,
}

/// Settings for the trigger-worker poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// How often the loop checks the signal channel for due deliveries.
    pub poll_interval_ms: u64,
    /// Back-off before a failed tick cycle's signal is redelivered.
    pub retry_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            profile: env_or("METRONOME_PROFILE", ""),
            worker: WorkerConfig {
                poll_interval_ms: env_u64("METRONOME_POLL_INTERVAL_MS", 500),
                retry_delay_ms: env_u64("METRONOME_RETRY_DELAY_MS", 1_000),
            },
        }
    }
}

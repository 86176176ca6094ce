//! Environment-driven configuration

use std::path::PathBuf;
use tracing::warn;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_RECOMPUTE_TIME: (u32, u32) = (19, 0);

/// Runtime configuration, read from the environment with logged defaults
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Batch worker count; also bounds the connection pool
    pub workers: usize,
    /// Daily recompute time, IST wall clock
    pub recompute_hour: u32,
    pub recompute_minute: u32,
    /// Run the daily scheduler instead of a single-shot batch
    pub schedule_enabled: bool,
}

impl Config {
    /// Load configuration from `DELIVERYTRACK_*` environment variables
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DELIVERYTRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let workers = match std::env::var("DELIVERYTRACK_WORKERS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid DELIVERYTRACK_WORKERS {:?}, using {}", raw, DEFAULT_WORKERS);
                DEFAULT_WORKERS
            }),
            Err(_) => DEFAULT_WORKERS,
        };

        let (recompute_hour, recompute_minute) = match std::env::var("DELIVERYTRACK_RECOMPUTE_TIME")
        {
            Ok(raw) => parse_wall_clock(&raw).unwrap_or_else(|| {
                warn!(
                    "Invalid DELIVERYTRACK_RECOMPUTE_TIME {:?}, using {:02}:{:02}",
                    raw, DEFAULT_RECOMPUTE_TIME.0, DEFAULT_RECOMPUTE_TIME.1
                );
                DEFAULT_RECOMPUTE_TIME
            }),
            Err(_) => DEFAULT_RECOMPUTE_TIME,
        };

        let schedule_enabled = std::env::var("DELIVERYTRACK_SCHEDULE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            data_dir,
            workers: workers.max(1),
            recompute_hour,
            recompute_minute,
            schedule_enabled,
        }
    }

    /// Path of the SQLite database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("deliverytrack.db")
    }
}

/// Parse an `HH:MM` wall-clock string
fn parse_wall_clock(raw: &str) -> Option<(u32, u32)> {
    let (hour, minute) = raw.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

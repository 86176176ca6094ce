//! Batch entry point
//!
//! Single-shot by default: runs one recompute pass over all active symbols
//! and prints the spike leaderboard as JSON. With `DELIVERYTRACK_SCHEDULE=1`
//! it instead keeps running and recomputes daily at the configured IST time.

use deliverytrack::scheduler::RecomputeScheduler;
use deliverytrack::services::{CancelFlag, RecomputeService};
use deliverytrack::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deliverytrack=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting deliverytrack with {:?}", config);
    let state = Arc::new(AppState::new(config)?);

    if state.config.schedule_enabled {
        RecomputeScheduler::new(Arc::clone(&state)).start();
        loop {
            std::thread::sleep(std::time::Duration::from_secs(3600));
        }
    }

    let summary = RecomputeService::run(&state.db, state.config.workers, &CancelFlag::new())?;
    tracing::info!(
        "Recompute complete: {}/{} symbols processed, {} failed",
        summary.processed,
        summary.total,
        summary.failed
    );

    let leaders = state.db.list_spike_counts()?;
    println!("{}", serde_json::to_string_pretty(&leaders)?);

    Ok(())
}

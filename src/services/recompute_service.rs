//! Spike count recompute job
//!
//! Re-derives every active symbol's four period counts from its full daily
//! history and overwrites the stored row. Symbols are independent, so a
//! bounded pool of worker threads drains them from a shared queue; the
//! connection pool caps read concurrency at the same bound.

use super::ist_today;
use crate::db::models::SpikeCount;
use crate::db::SqliteDb;
use crate::engine;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Cooperative cancellation flag shared with the recompute workers.
///
/// Cancelling stops workers from taking new symbols; in-flight symbols
/// finish, so every written row stays consistent.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one recompute run
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeSummary {
    pub as_of: NaiveDate,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
}

/// Batch recompute of spike counts for all active symbols
pub struct RecomputeService;

impl RecomputeService {
    /// Run the job as of today on the Indian trading calendar
    pub fn run(db: &SqliteDb, workers: usize, cancel: &CancelFlag) -> Result<RecomputeSummary> {
        Self::run_as_of(db, ist_today(), workers, cancel)
    }

    /// Run the job for an explicit as-of date.
    ///
    /// Every row written in one run carries the same `updated_at` (the job
    /// start instant), so a finished run reads as a single snapshot. A
    /// per-symbol failure is logged and counted without aborting the run;
    /// that symbol's row stays stale until the next successful pass.
    pub fn run_as_of(
        db: &SqliteDb,
        as_of: NaiveDate,
        workers: usize,
        cancel: &CancelFlag,
    ) -> Result<RecomputeSummary> {
        let started_at = Utc::now();
        let symbols = db.active_symbols()?;
        let total = symbols.len();
        info!("Recomputing spike counts for {} symbols as of {}", total, as_of);

        let queue: Mutex<VecDeque<String>> = Mutex::new(symbols.into());
        let processed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..workers.max(1) {
                scope.spawn(|| loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let symbol = match queue.lock().pop_front() {
                        Some(symbol) => symbol,
                        None => break,
                    };

                    match Self::recompute_symbol(db, &symbol, as_of, started_at) {
                        Ok(counts) => {
                            processed.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(
                                "Recomputed {}: 1w={} 1m={} 3m={} 6m={}",
                                symbol,
                                counts.spikes_1w,
                                counts.spikes_1m,
                                counts.spikes_3m,
                                counts.spikes_6m
                            );
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            warn!("Recompute failed for {}: {}", symbol, e);
                        }
                    }
                });
            }
        });

        let skipped = queue.lock().len();
        let summary = RecomputeSummary {
            as_of,
            total,
            processed: processed.into_inner(),
            failed: failed.into_inner(),
            skipped,
            started_at,
        };
        info!(
            "Recompute finished: {}/{} processed, {} failed, {} skipped",
            summary.processed, summary.total, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    /// Recompute and persist one symbol's counts (one atomic row write)
    fn recompute_symbol(
        db: &SqliteDb,
        symbol: &str,
        as_of: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<engine::PeriodCounts> {
        let history = db.fetch_series(symbol, as_of)?;
        let counts = engine::count_all_periods(&history, as_of);

        db.upsert_spike_count(&SpikeCount {
            symbol: symbol.to_string(),
            spikes_1w: counts.spikes_1w,
            spikes_1m: counts.spikes_1m,
            spikes_3m: counts.spikes_3m,
            spikes_6m: counts.spikes_6m,
            updated_at,
        })?;

        Ok(counts)
    }
}

//! On-demand symbol evaluation
//!
//! Reproduces the batch pipeline for a single symbol without persisting
//! anything, for the interactive detail view. Calls the exact same engine
//! functions as the batch path; the numbers must be byte-for-byte the
//! batch numbers for the same inputs and as-of date.

use super::ist_today;
use crate::db::SqliteDb;
use crate::engine::{self, is_spike_day_adaptive};
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// One historical day's classification, for chart overlay
#[derive(Debug, Clone, Serialize)]
pub struct DayClassification {
    pub trade_date: NaiveDate,
    pub delivery_percentage: Option<f64>,
    /// Canonical rule; matches what the batch job counts
    pub spike: bool,
    /// Relaxed early-history rule; display only, never counted
    pub adaptive_spike: bool,
}

/// Full evaluation result for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct SymbolEvaluation {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub spikes_1w: u32,
    pub spikes_1m: u32,
    pub spikes_3m: u32,
    pub spikes_6m: u32,
    pub days: Vec<DayClassification>,
}

/// On-demand spike evaluation for one symbol
pub struct EvaluationService;

impl EvaluationService {
    /// Evaluate a symbol as of `as_of`, defaulting to its latest available
    /// trade date (markets may be closed today). A symbol with no data at
    /// all evaluates to zero counts as of today in IST.
    pub fn evaluate(
        db: &SqliteDb,
        symbol: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<SymbolEvaluation> {
        let as_of = match as_of {
            Some(date) => date,
            None => db.latest_trade_date(symbol)?.unwrap_or_else(ist_today),
        };

        let history = db.fetch_series(symbol, as_of)?;
        let counts = engine::count_all_periods(&history, as_of);
        let flags = engine::spike_flags(&history, as_of);

        let values: Vec<Option<f64>> = history.iter().map(|r| r.delivery_percentage).collect();
        let days = history
            .iter()
            .enumerate()
            .map(|(i, record)| DayClassification {
                trade_date: record.trade_date,
                delivery_percentage: record.delivery_percentage,
                spike: flags[i],
                adaptive_spike: is_spike_day_adaptive(&values, i),
            })
            .collect();

        debug!(
            "Evaluated {} as of {}: 1w={} 1m={} 3m={} 6m={}",
            symbol, as_of, counts.spikes_1w, counts.spikes_1m, counts.spikes_3m, counts.spikes_6m
        );

        Ok(SymbolEvaluation {
            symbol: symbol.to_string(),
            as_of,
            spikes_1w: counts.spikes_1w,
            spikes_1m: counts.spikes_1m,
            spikes_3m: counts.spikes_3m,
            spikes_6m: counts.spikes_6m,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{DailyRecord, TrackedSymbol};
    use crate::services::{CancelFlag, RecomputeService};
    use chrono::Duration;
    use tempfile::TempDir;

    fn open_db() -> (TempDir, SqliteDb) {
        let dir = TempDir::new().unwrap();
        let db = SqliteDb::new(&dir.path().join("test.db"), 4).unwrap();
        (dir, db)
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn store_ramp(db: &SqliteDb, symbol: &str, len: usize) {
        let records: Vec<DailyRecord> = (0..len)
            .map(|i| DailyRecord {
                symbol: symbol.to_string(),
                series: "EQ".to_string(),
                trade_date: day(i as i64),
                delivery_percentage: Some(10.0 + i as f64 * 0.4),
            })
            .collect();
        db.store_daily_records(&records).unwrap();
    }

    #[test]
    fn test_matches_batch_counts() {
        let (_dir, db) = open_db();
        for (symbol, len) in [("RAMP", 200usize), ("SHORT", 50)] {
            db.upsert_symbol(&TrackedSymbol {
                symbol: symbol.to_string(),
                name: None,
                active: true,
            })
            .unwrap();
            store_ramp(&db, symbol, len);
        }

        let as_of = day(199);
        RecomputeService::run_as_of(&db, as_of, 2, &CancelFlag::new()).unwrap();

        for symbol in ["RAMP", "SHORT"] {
            let persisted = db.get_spike_count(symbol).unwrap().unwrap();
            let evaluated = EvaluationService::evaluate(&db, symbol, Some(as_of)).unwrap();
            assert_eq!(evaluated.spikes_1w, persisted.spikes_1w);
            assert_eq!(evaluated.spikes_1m, persisted.spikes_1m);
            assert_eq!(evaluated.spikes_3m, persisted.spikes_3m);
            assert_eq!(evaluated.spikes_6m, persisted.spikes_6m);
        }
    }

    #[test]
    fn test_defaults_to_latest_trade_date() {
        let (_dir, db) = open_db();
        store_ramp(&db, "RAMP", 200);

        let evaluation = EvaluationService::evaluate(&db, "RAMP", None).unwrap();
        assert_eq!(evaluation.as_of, day(199));
        assert_eq!(evaluation.spikes_1w, 7);
    }

    #[test]
    fn test_day_flags_align_with_history() {
        let (_dir, db) = open_db();
        store_ramp(&db, "RAMP", 200);

        let evaluation = EvaluationService::evaluate(&db, "RAMP", Some(day(199))).unwrap();
        assert_eq!(evaluation.days.len(), 200);
        assert!(!evaluation.days[178].spike);
        assert!(evaluation.days[179].spike);
        assert!(evaluation.days[199].spike);
    }

    #[test]
    fn test_adaptive_flag_is_display_only() {
        let (_dir, db) = open_db();
        store_ramp(&db, "SHORT", 50);

        let evaluation = EvaluationService::evaluate(&db, "SHORT", Some(day(49))).unwrap();
        // Too little history for canonical spikes, so all counts stay zero
        assert_eq!(evaluation.spikes_6m, 0);
        assert!(evaluation.days.iter().all(|d| !d.spike));
        // But the relaxed chart overlay does mark the late ramp days
        assert!(evaluation.days.last().unwrap().adaptive_spike);
    }

    #[test]
    fn test_unknown_symbol_evaluates_to_zero() {
        let (_dir, db) = open_db();
        let evaluation = EvaluationService::evaluate(&db, "MISSING", None).unwrap();
        assert_eq!(evaluation.spikes_1w, 0);
        assert_eq!(evaluation.spikes_6m, 0);
        assert!(evaluation.days.is_empty());
    }

    #[test]
    fn test_historical_as_of_ignores_later_data() {
        let (_dir, db) = open_db();
        store_ramp(&db, "RAMP", 250);

        let evaluation = EvaluationService::evaluate(&db, "RAMP", Some(day(199))).unwrap();
        assert_eq!(evaluation.days.len(), 200);
        assert_eq!(evaluation.spikes_1w, 7);
    }
}

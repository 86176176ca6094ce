//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One trading day's delivery data for one symbol
///
/// At most one record exists per `(symbol, series, trade_date)`. Records are
/// immutable once ingested; the engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub symbol: String,
    pub series: String,
    pub trade_date: NaiveDate,
    /// Percentage in [0, 100]; absent when the exchange file omits it
    pub delivery_percentage: Option<f64>,
}

/// Derived spike counts for one symbol
///
/// Fully overwritten on every batch run; a rebuildable cache over
/// `DailyRecord` history, never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeCount {
    pub symbol: String,
    pub spikes_1w: u32,
    pub spikes_1m: u32,
    pub spikes_3m: u32,
    pub spikes_6m: u32,
    pub updated_at: DateTime<Utc>,
}

/// Reference master list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSymbol {
    pub symbol: String,
    pub name: Option<String>,
    pub active: bool,
}

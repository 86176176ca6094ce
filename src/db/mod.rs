//! SQLite database module
//!
//! A pooled connection wrapper over the three tables the tracker owns:
//! the symbol master list, the daily delivery records, and the derived
//! spike counts. The pool is sized to the batch worker count so read
//! concurrency stays bounded by configuration.

pub mod models;
mod migrations;
mod daily;
mod spike;
mod symbol;

use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use models::{DailyRecord, SpikeCount, TrackedSymbol};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub use daily::{normalize_delivery_percentage, RawDeliveryRow, EQ_SERIES};

/// SQLite database wrapper
pub struct SqliteDb {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDb {
    /// Open the database at `path` with a pool of `max_connections`
    pub fn new(path: &Path, max_connections: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            // WAL lets the batch workers read while a row upsert commits
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        });

        let pool = Pool::builder()
            .max_size(max_connections.max(1))
            .build(manager)?;

        let db = Self { pool };
        db.run_migrations()?;

        Ok(db)
    }

    pub(crate) fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        migrations::run_migrations(&conn)
    }

    // ========== Daily Series Methods ==========

    /// Ingest raw exchange delivery rows (EQ series only)
    pub fn ingest_delivery_rows(&self, rows: &[RawDeliveryRow]) -> Result<usize> {
        let mut conn = self.conn()?;
        daily::ingest_delivery_rows(&mut conn, rows)
    }

    /// Store already-normalized daily records
    pub fn store_daily_records(&self, records: &[DailyRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        daily::store_daily_records(&mut conn, records)
    }

    /// Fetch a symbol's full EQ series through a date, ascending
    pub fn fetch_series(&self, symbol: &str, through: NaiveDate) -> Result<Vec<DailyRecord>> {
        let conn = self.conn()?;
        daily::fetch_series(&conn, symbol, through)
    }

    /// Latest EQ trade date for a symbol
    pub fn latest_trade_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let conn = self.conn()?;
        daily::latest_trade_date(&conn, symbol)
    }

    // ========== Symbol Methods ==========

    /// Insert or update a tracked symbol
    pub fn upsert_symbol(&self, symbol: &TrackedSymbol) -> Result<()> {
        let conn = self.conn()?;
        symbol::upsert_symbol(&conn, symbol)
    }

    /// All active symbols, ordered by symbol
    pub fn active_symbols(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        symbol::active_symbols(&conn)
    }

    /// Flip a symbol's active flag
    pub fn set_symbol_active(&self, symbol: &str, active: bool) -> Result<bool> {
        let conn = self.conn()?;
        symbol::set_symbol_active(&conn, symbol, active)
    }

    /// Remove a symbol with its records and counts
    pub fn deprovision_symbol(&self, symbol: &str) -> Result<()> {
        let mut conn = self.conn()?;
        symbol::deprovision_symbol(&mut conn, symbol)
    }

    // ========== Spike Count Methods ==========

    /// Insert or fully overwrite a symbol's spike counts
    pub fn upsert_spike_count(&self, count: &SpikeCount) -> Result<()> {
        let conn = self.conn()?;
        spike::upsert_spike_count(&conn, count)
    }

    /// Spike counts for one symbol
    pub fn get_spike_count(&self, symbol: &str) -> Result<Option<SpikeCount>> {
        let conn = self.conn()?;
        spike::get_spike_count(&conn, symbol)
    }

    /// Symbols with any non-zero counter, busiest week first
    pub fn list_spike_counts(&self) -> Result<Vec<SpikeCount>> {
        let conn = self.conn()?;
        spike::list_spike_counts(&conn)
    }
}

/// Parse an ISO `YYYY-MM-DD` date stored in the database
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::Validation(format!("Invalid date {:?}: {}", value, e)))
}

/// Parse an RFC 3339 timestamp stored in the database
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Validation(format!("Invalid timestamp {:?}: {}", value, e)))
}

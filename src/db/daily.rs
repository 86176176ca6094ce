//! Daily delivery series storage
//!
//! The DailySeriesSource side of the store: ingestion of exchange delivery
//! rows and ascending per-symbol series reads. Only the "EQ" (equity) series
//! is ever served to the engine. Normalization of the raw delivery field
//! happens here, at the boundary, so the engine never sees raw strings.

use super::models::DailyRecord;
use super::parse_date;
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Deserialize;

/// The equity market segment code; the engine only processes this series.
pub const EQ_SERIES: &str = "EQ";

/// One row of an exchange security-wise delivery file, fields as delivered.
///
/// The delivery percentage arrives as free-form text ("71.56", "-", "", "NA").
#[derive(Debug, Clone, Deserialize)]
pub struct RawDeliveryRow {
    pub symbol: String,
    pub series: String,
    pub trade_date: String,
    pub delivery_percentage: Option<String>,
}

/// Normalize a raw delivery-percentage field to an optional number.
///
/// Blank and placeholder markers become `None`; parseable values outside
/// [0, 100] are rejected as `None` with a warning rather than poisoning the
/// averages.
pub fn normalize_delivery_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nil") {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if (0.0..=100.0).contains(&value) => Some(value),
        Ok(value) => {
            tracing::warn!("Delivery percentage {} out of range, treating as absent", value);
            None
        }
        Err(_) => {
            tracing::warn!("Unparseable delivery percentage {:?}, treating as absent", trimmed);
            None
        }
    }
}

/// Ingest raw exchange delivery rows (batch insert with transaction).
///
/// Non-EQ rows are dropped; re-ingesting a trading day replaces its rows
/// (exchange files are occasionally republished with corrections). Returns
/// the number of rows stored.
pub fn ingest_delivery_rows(conn: &mut Connection, rows: &[RawDeliveryRow]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut stored = 0usize;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO daily_records (symbol, series, trade_date, delivery_percentage)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(symbol, series, trade_date)
             DO UPDATE SET delivery_percentage = excluded.delivery_percentage",
        )?;

        for row in rows {
            if row.series != EQ_SERIES {
                continue;
            }
            // Validate the date up front so a malformed row fails loudly at
            // ingestion instead of corrupting later reads
            let trade_date = parse_date(&row.trade_date)?;
            let percentage = row
                .delivery_percentage
                .as_deref()
                .and_then(normalize_delivery_percentage);

            stmt.execute(params![
                row.symbol,
                row.series,
                trade_date.format("%Y-%m-%d").to_string(),
                percentage,
            ])?;
            stored += 1;
        }
    }

    tx.commit()?;
    tracing::info!("Ingested {} delivery records ({} rows supplied)", stored, rows.len());
    Ok(stored)
}

/// Store already-normalized daily records (used by tests and backfills).
pub fn store_daily_records(conn: &mut Connection, records: &[DailyRecord]) -> Result<usize> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO daily_records (symbol, series, trade_date, delivery_percentage)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(symbol, series, trade_date)
             DO UPDATE SET delivery_percentage = excluded.delivery_percentage",
        )?;

        for record in records {
            stmt.execute(params![
                record.symbol,
                record.series,
                record.trade_date.format("%Y-%m-%d").to_string(),
                record.delivery_percentage,
            ])?;
        }
    }

    tx.commit()?;
    Ok(records.len())
}

/// Fetch a symbol's full EQ series through `through`, ascending by date.
pub fn fetch_series(conn: &Connection, symbol: &str, through: NaiveDate) -> Result<Vec<DailyRecord>> {
    let mut stmt = conn.prepare(
        "SELECT symbol, series, trade_date, delivery_percentage
         FROM daily_records
         WHERE symbol = ?1 AND series = ?2 AND trade_date <= ?3
         ORDER BY trade_date ASC",
    )?;

    let rows: Vec<(String, String, String, Option<f64>)> = stmt
        .query_map(
            params![symbol, EQ_SERIES, through.format("%Y-%m-%d").to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (symbol, series, trade_date, delivery_percentage) in rows {
        records.push(DailyRecord {
            symbol,
            series,
            trade_date: parse_date(&trade_date)?,
            delivery_percentage,
        });
    }

    Ok(records)
}

/// Latest EQ trade date for a symbol, if any data exists.
pub fn latest_trade_date(conn: &Connection, symbol: &str) -> Result<Option<NaiveDate>> {
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(trade_date) FROM daily_records WHERE symbol = ?1 AND series = ?2",
        params![symbol, EQ_SERIES],
        |row| row.get(0),
    )?;

    match latest {
        Some(date) => Ok(Some(parse_date(&date)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_value() {
        assert_eq!(normalize_delivery_percentage("71.56"), Some(71.56));
        assert_eq!(normalize_delivery_percentage(" 40 "), Some(40.0));
        assert_eq!(normalize_delivery_percentage("0"), Some(0.0));
        assert_eq!(normalize_delivery_percentage("100"), Some(100.0));
    }

    #[test]
    fn test_normalize_placeholders() {
        assert_eq!(normalize_delivery_percentage(""), None);
        assert_eq!(normalize_delivery_percentage("-"), None);
        assert_eq!(normalize_delivery_percentage("NA"), None);
        assert_eq!(normalize_delivery_percentage("nil"), None);
    }

    #[test]
    fn test_normalize_rejects_out_of_range() {
        assert_eq!(normalize_delivery_percentage("123.4"), None);
        assert_eq!(normalize_delivery_percentage("-5"), None);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_delivery_percentage("12,34"), None);
        assert_eq!(normalize_delivery_percentage("pct"), None);
    }
}

//! Spike count persistence
//!
//! One row per symbol, overwritten whole on every recompute. The table is a
//! derived cache over daily records, so every write is a full upsert rather
//! than an increment.

use super::models::SpikeCount;
use super::parse_timestamp;
use crate::error::Result;
use chrono::SecondsFormat;
use rusqlite::{params, Connection};

/// Insert or fully overwrite a symbol's spike counts
pub fn upsert_spike_count(conn: &Connection, count: &SpikeCount) -> Result<()> {
    conn.execute(
        "INSERT INTO spike_counts (symbol, spikes_1w, spikes_1m, spikes_3m, spikes_6m, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(symbol) DO UPDATE SET
            spikes_1w = excluded.spikes_1w,
            spikes_1m = excluded.spikes_1m,
            spikes_3m = excluded.spikes_3m,
            spikes_6m = excluded.spikes_6m,
            updated_at = excluded.updated_at",
        params![
            count.symbol,
            count.spikes_1w,
            count.spikes_1m,
            count.spikes_3m,
            count.spikes_6m,
            count.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ],
    )?;
    Ok(())
}

/// Spike counts for one symbol, if a row exists
pub fn get_spike_count(conn: &Connection, symbol: &str) -> Result<Option<SpikeCount>> {
    let result = conn.query_row(
        "SELECT symbol, spikes_1w, spikes_1m, spikes_3m, spikes_6m, updated_at
         FROM spike_counts WHERE symbol = ?1",
        params![symbol],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        },
    );

    match result {
        Ok((symbol, spikes_1w, spikes_1m, spikes_3m, spikes_6m, updated_at)) => {
            Ok(Some(SpikeCount {
                symbol,
                spikes_1w,
                spikes_1m,
                spikes_3m,
                spikes_6m,
                updated_at: parse_timestamp(&updated_at)?,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Symbols with at least one non-zero counter, busiest week first.
///
/// All-zero symbols are omitted, which also hides symbols whose last
/// recompute failed and left them at zero.
pub fn list_spike_counts(conn: &Connection) -> Result<Vec<SpikeCount>> {
    let mut stmt = conn.prepare(
        "SELECT symbol, spikes_1w, spikes_1m, spikes_3m, spikes_6m, updated_at
         FROM spike_counts
         WHERE spikes_1w > 0 OR spikes_1m > 0 OR spikes_3m > 0 OR spikes_6m > 0
         ORDER BY spikes_1w DESC, symbol ASC",
    )?;

    let rows: Vec<(String, u32, u32, u32, u32, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut counts = Vec::with_capacity(rows.len());
    for (symbol, spikes_1w, spikes_1m, spikes_3m, spikes_6m, updated_at) in rows {
        counts.push(SpikeCount {
            symbol,
            spikes_1w,
            spikes_1m,
            spikes_3m,
            spikes_6m,
            updated_at: parse_timestamp(&updated_at)?,
        });
    }

    Ok(counts)
}

//! Reference symbol master list
//!
//! Tracks which symbols the batch job covers. Deprovisioning a symbol
//! removes everything derived from or belonging to it.

use super::models::TrackedSymbol;
use crate::error::Result;
use rusqlite::{params, Connection};

/// Insert or update a tracked symbol
pub fn upsert_symbol(conn: &Connection, symbol: &TrackedSymbol) -> Result<()> {
    conn.execute(
        "INSERT INTO symbols (symbol, name, active) VALUES (?1, ?2, ?3)
         ON CONFLICT(symbol) DO UPDATE SET name = excluded.name, active = excluded.active",
        params![symbol.symbol, symbol.name, symbol.active],
    )?;
    Ok(())
}

/// All symbols flagged active, ordered by symbol
pub fn active_symbols(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT symbol FROM symbols WHERE active = 1 ORDER BY symbol")?;

    let symbols = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(symbols)
}

/// Flip a symbol's active flag; returns false when the symbol is unknown
pub fn set_symbol_active(conn: &Connection, symbol: &str, active: bool) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE symbols SET active = ?2 WHERE symbol = ?1",
        params![symbol, active],
    )?;
    Ok(rows > 0)
}

/// Remove a symbol along with its daily records and spike counts
pub fn deprovision_symbol(conn: &mut Connection, symbol: &str) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM spike_counts WHERE symbol = ?1", params![symbol])?;
    tx.execute("DELETE FROM daily_records WHERE symbol = ?1", params![symbol])?;
    tx.execute("DELETE FROM symbols WHERE symbol = ?1", params![symbol])?;
    tx.commit()?;

    tracing::info!("Deprovisioned symbol {}", symbol);
    Ok(())
}

//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_symbols", CREATE_SYMBOLS_TABLE)?;
    run_migration(conn, "002_daily_records", CREATE_DAILY_RECORDS_TABLE)?;
    run_migration(conn, "003_spike_counts", CREATE_SPIKE_COUNTS_TABLE)?;

    tracing::debug!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_SYMBOLS_TABLE: &str = r#"
CREATE TABLE symbols (
    symbol TEXT PRIMARY KEY,
    name TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_DAILY_RECORDS_TABLE: &str = r#"
CREATE TABLE daily_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    series TEXT NOT NULL,
    trade_date TEXT NOT NULL,
    delivery_percentage REAL,
    UNIQUE(symbol, series, trade_date)
);
CREATE INDEX IF NOT EXISTS idx_daily_records_lookup
    ON daily_records(symbol, series, trade_date);
"#;

const CREATE_SPIKE_COUNTS_TABLE: &str = r#"
CREATE TABLE spike_counts (
    symbol TEXT PRIMARY KEY,
    spikes_1w INTEGER NOT NULL DEFAULT 0,
    spikes_1m INTEGER NOT NULL DEFAULT 0,
    spikes_3m INTEGER NOT NULL DEFAULT 0,
    spikes_6m INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_spike_counts_week ON spike_counts(spikes_1w);
"#;

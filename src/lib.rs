//! Delivery percentage spike tracking engine for NSE equities
//!
//! For every tracked symbol (EQ series only) the engine computes trailing
//! rolling averages of the daily delivery percentage over five nested
//! windows (1, 3, 7, 30, 180 trading days), classifies a trading day as a
//! spike when the averages are strictly decreasing with window length, and
//! accumulates spike counts over four trailing reporting periods (1 week,
//! 1 month, 3 months, 6 months).
//!
//! The same pure engine backs two entry points: a scheduled batch job that
//! overwrites one derived `spike_counts` row per active symbol, and an
//! on-demand evaluator that reproduces the identical numbers for a single
//! symbol plus per-day flags for charting.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;

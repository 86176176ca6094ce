//! Per-day spike classification
//!
//! A trading day is a spike day when the trailing averages over the five
//! nested windows are strictly decreasing with window length: the 1-day
//! average exceeds the 3-day, which exceeds the 7-day, and so on out to 180
//! trading days. Recent delivery outpacing every longer-run baseline is the
//! signal being detected.

use super::window::trailing_average;
use serde::{Deserialize, Serialize};

/// Nested window lengths, in trading days, shortest first.
pub const WINDOWS: [usize; 5] = [1, 3, 7, 30, 180];

/// The five trailing averages for a single trading day.
///
/// Ephemeral: computed during a pipeline pass, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowSet {
    pub avg_1d: Option<f64>,
    pub avg_3d: Option<f64>,
    pub avg_7d: Option<f64>,
    pub avg_30d: Option<f64>,
    pub avg_180d: Option<f64>,
}

impl RollingWindowSet {
    /// Compute all five trailing averages ending at `index`.
    pub fn compute(values: &[Option<f64>], index: usize) -> Self {
        Self {
            avg_1d: trailing_average(values, index, WINDOWS[0]),
            avg_3d: trailing_average(values, index, WINDOWS[1]),
            avg_7d: trailing_average(values, index, WINDOWS[2]),
            avg_30d: trailing_average(values, index, WINDOWS[3]),
            avg_180d: trailing_average(values, index, WINDOWS[4]),
        }
    }

    fn as_array(&self) -> [Option<f64>; 5] {
        [
            self.avg_1d,
            self.avg_3d,
            self.avg_7d,
            self.avg_30d,
            self.avg_180d,
        ]
    }
}

/// Canonical spike classification for the day at `index`.
///
/// Requires at least 180 trading days of history up to and including the
/// day (otherwise the 180-day window would be silently clipped and the day
/// must not qualify), all five averages present, and a strict descending
/// chain `avg1 > avg3 > avg7 > avg30 > avg180`. Equality anywhere
/// disqualifies the day.
///
/// This is the only rule that may reach persisted spike counts.
pub fn is_spike_day(values: &[Option<f64>], index: usize) -> bool {
    if index + 1 < WINDOWS[4] {
        return false;
    }
    strictly_descending(&RollingWindowSet::compute(values, index).as_array())
}

/// Presentation-only adaptive classification.
///
/// Uses every window that fully fits in the available history (at least
/// two), same strict descending chain over those. Lets charts flag early
/// series days; stored counts never use this rule.
pub fn is_spike_day_adaptive(values: &[Option<f64>], index: usize) -> bool {
    let averages: Vec<Option<f64>> = WINDOWS
        .iter()
        .filter(|&&w| index + 1 >= w)
        .map(|&w| trailing_average(values, index, w))
        .collect();

    if averages.len() < 2 {
        return false;
    }
    strictly_descending(&averages)
}

fn strictly_descending(averages: &[Option<f64>]) -> bool {
    averages
        .windows(2)
        .all(|pair| match (pair[0], pair[1]) {
            (Some(shorter), Some(longer)) => shorter > longer,
            _ => false,
        })
}

//! Period-bounded spike counting
//!
//! Counts spike days over the four trailing reporting periods, relative to
//! an explicit as-of date. Everything here is a pure function of the input
//! history and the as-of date: the ambient clock is never consulted, so
//! batch runs are reproducible and tests can pin dates.

use super::classifier::is_spike_day;
use crate::db::models::DailyRecord;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Trailing reporting period over which spike days are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// 1 week (7 calendar days)
    Week,
    /// 1 month (30 calendar days)
    Month,
    /// 3 months (90 calendar days)
    Quarter,
    /// 6 months (180 calendar days)
    HalfYear,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Week,
        Period::Month,
        Period::Quarter,
        Period::HalfYear,
    ];

    /// Period length in calendar days.
    pub fn calendar_days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::HalfYear => 180,
        }
    }

    /// Inclusive start of the period ending at `as_of`.
    pub fn cutoff(self, as_of: NaiveDate) -> NaiveDate {
        as_of - Duration::days(self.calendar_days() - 1)
    }
}

/// Spike-day counts over all four trailing periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCounts {
    pub spikes_1w: u32,
    pub spikes_1m: u32,
    pub spikes_3m: u32,
    pub spikes_6m: u32,
}

impl PeriodCounts {
    pub fn get(&self, period: Period) -> u32 {
        match period {
            Period::Week => self.spikes_1w,
            Period::Month => self.spikes_1m,
            Period::Quarter => self.spikes_3m,
            Period::HalfYear => self.spikes_6m,
        }
    }

    fn slot(&mut self, period: Period) -> &mut u32 {
        match period {
            Period::Week => &mut self.spikes_1w,
            Period::Month => &mut self.spikes_1m,
            Period::Quarter => &mut self.spikes_3m,
            Period::HalfYear => &mut self.spikes_6m,
        }
    }
}

/// Classify every day of `history` up to `as_of` under the canonical rule.
///
/// `history` must be ascending by trade date; days after `as_of` are cut
/// off before classification so they can never leak into a window. The
/// returned flags are parallel to the truncated history.
pub fn spike_flags(history: &[DailyRecord], as_of: NaiveDate) -> Vec<bool> {
    let visible = visible_range(history, as_of);
    let values: Vec<Option<f64>> = visible.iter().map(|r| r.delivery_percentage).collect();
    (0..visible.len()).map(|i| is_spike_day(&values, i)).collect()
}

/// Count spike days over all four periods in a single classification pass.
///
/// Each longer period's date range is a superset of every shorter one's, so
/// the counts are monotonically non-decreasing from week to half-year by
/// construction. A symbol with no data in range yields all zeros.
pub fn count_all_periods(history: &[DailyRecord], as_of: NaiveDate) -> PeriodCounts {
    let visible = visible_range(history, as_of);
    let flags = spike_flags(history, as_of);

    let mut counts = PeriodCounts::default();
    for (record, spike) in visible.iter().zip(flags) {
        if !spike {
            continue;
        }
        for period in Period::ALL {
            if record.trade_date >= period.cutoff(as_of) {
                *counts.slot(period) += 1;
            }
        }
    }
    counts
}

/// Count spike days whose trade date falls within one trailing period.
pub fn count_spike_days(history: &[DailyRecord], as_of: NaiveDate, period: Period) -> u32 {
    count_all_periods(history, as_of).get(period)
}

fn visible_range(history: &[DailyRecord], as_of: NaiveDate) -> &[DailyRecord] {
    debug_assert!(history.windows(2).all(|w| w[0].trade_date <= w[1].trade_date));
    let upto = history.partition_point(|r| r.trade_date <= as_of);
    &history[..upto]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn series(values: &[Option<f64>]) -> Vec<DailyRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, dp)| DailyRecord {
                symbol: "RELIANCE".to_string(),
                series: "EQ".to_string(),
                trade_date: day(i as i64),
                delivery_percentage: *dp,
            })
            .collect()
    }

    fn ramp(len: usize) -> Vec<DailyRecord> {
        series(&(0..len).map(|i| Some(10.0 + i as f64 * 0.4)).collect::<Vec<_>>())
    }

    #[test]
    fn test_constant_series_counts_zero() {
        let history = series(&vec![Some(40.0); 200]);
        let counts = count_all_periods(&history, day(199));
        assert_eq!(counts, PeriodCounts::default());
    }

    #[test]
    fn test_ramp_counts() {
        // Days 179..=199 qualify; only the last 7 fall in the week period
        let history = ramp(200);
        let counts = count_all_periods(&history, day(199));
        assert_eq!(counts.spikes_1w, 7);
        assert_eq!(counts.spikes_1m, 21);
        assert_eq!(counts.spikes_3m, 21);
        assert_eq!(counts.spikes_6m, 21);
    }

    #[test]
    fn test_period_monotonicity() {
        let history = ramp(400);
        let counts = count_all_periods(&history, day(399));
        assert!(counts.spikes_1w <= counts.spikes_1m);
        assert!(counts.spikes_1m <= counts.spikes_3m);
        assert!(counts.spikes_3m <= counts.spikes_6m);
    }

    #[test]
    fn test_short_history_counts_zero() {
        let history = ramp(50);
        let counts = count_all_periods(&history, day(49));
        assert_eq!(counts, PeriodCounts::default());
    }

    #[test]
    fn test_empty_history_counts_zero() {
        assert_eq!(count_all_periods(&[], day(0)), PeriodCounts::default());
    }

    #[test]
    fn test_as_of_before_all_data_counts_zero() {
        let history = ramp(200);
        let counts = count_all_periods(&history, day(-1));
        assert_eq!(counts, PeriodCounts::default());
    }

    #[test]
    fn test_single_day_anomaly_in_flat_series() {
        // One 99% day in a flat 40% series lifts every shorter window above
        // the longer ones on that day only
        let mut values = vec![Some(40.0); 200];
        values[195] = Some(99.0);
        let history = series(&values);

        let flags = spike_flags(&history, day(199));
        assert!(flags[195]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);

        let counts = count_all_periods(&history, day(199));
        assert_eq!(counts.spikes_1w, 1);
        assert_eq!(counts.spikes_6m, 1);
    }

    #[test]
    fn test_days_after_as_of_are_invisible() {
        let history = ramp(200);
        // Evaluating as of day 150 must ignore the later ramp entirely
        let flags = spike_flags(&history, day(150));
        assert_eq!(flags.len(), 151);
        let counts = count_all_periods(&history, day(150));
        assert_eq!(counts, count_all_periods(&history[..151], day(150)));
    }

    #[test]
    fn test_single_period_matches_combined() {
        let history = ramp(200);
        let counts = count_all_periods(&history, day(199));
        for period in Period::ALL {
            assert_eq!(count_spike_days(&history, day(199), period), counts.get(period));
        }
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        assert_eq!(Period::Week.cutoff(day(6)), day(0));
        assert_eq!(Period::HalfYear.cutoff(day(179)), day(0));
    }
}

//! Trailing window averages
//!
//! Delivery percentage is reported per trading day and may be absent for a
//! given day. The averager works on series positions (trading days), never
//! calendar gaps: the window `[max(0, index - window + 1), index]` covers the
//! last `window` *observations* ending at `index`.

/// Arithmetic mean of the non-null values in the trailing window of length
/// `window` ending at (and including) `index`.
///
/// Returns `None` only when the window contains zero non-null observations.
/// The window is clipped at the start of the series and never reads past
/// `index`.
pub fn trailing_average(values: &[Option<f64>], index: usize, window: usize) -> Option<f64> {
    debug_assert!(index < values.len());
    debug_assert!(window > 0);

    let start = (index + 1).saturating_sub(window);
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in values[start..=index].iter().flatten() {
        sum += value;
        count += 1;
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_mean() {
        let values = vec![Some(10.0), Some(20.0), Some(30.0)];
        assert_eq!(trailing_average(&values, 2, 3), Some(20.0));
        assert_eq!(trailing_average(&values, 2, 1), Some(30.0));
        assert_eq!(trailing_average(&values, 1, 2), Some(15.0));
    }

    #[test]
    fn test_window_clipped_at_series_start() {
        // A 180-day window at index 1 only sees positions 0..=1
        let values = vec![Some(40.0), Some(60.0), Some(99.0)];
        assert_eq!(trailing_average(&values, 1, 180), Some(50.0));
    }

    #[test]
    fn test_never_reads_ahead_of_index() {
        // Values after `index` must not influence the result
        let base = vec![Some(10.0), Some(20.0), Some(30.0), Some(999.0)];
        let truncated = &base[..3];
        assert_eq!(
            trailing_average(&base, 2, 3),
            trailing_average(truncated, 2, 3)
        );
    }

    #[test]
    fn test_all_null_window_has_no_value() {
        let values = vec![None, None, None];
        assert_eq!(trailing_average(&values, 2, 3), None);
    }

    #[test]
    fn test_single_valid_among_nulls() {
        let values = vec![None, Some(42.5), None];
        assert_eq!(trailing_average(&values, 2, 3), Some(42.5));
    }

    #[test]
    fn test_nulls_excluded_not_zeroed() {
        // Mean of {30, 50}, not {30, 0, 50}
        let values = vec![Some(30.0), None, Some(50.0)];
        assert_eq!(trailing_average(&values, 2, 3), Some(40.0));
    }
}

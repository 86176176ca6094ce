//! Rolling-window spike detection core
//!
//! Pure functions over ascending daily delivery-percentage series. Both the
//! batch recompute job and the on-demand evaluator call into this module, so
//! there is exactly one implementation of the averaging, classification and
//! period-counting rules reaching persisted counts.
//!
//! - `window` - trailing averages over N trading days with null handling
//! - `classifier` - per-day spike classification over the five nested windows
//! - `aggregator` - spike counts over the four trailing reporting periods

pub mod aggregator;
pub mod classifier;
pub mod window;

pub use aggregator::{count_all_periods, count_spike_days, spike_flags, Period, PeriodCounts};
pub use classifier::{is_spike_day, is_spike_day_adaptive, RollingWindowSet, WINDOWS};
pub use window::trailing_average;

//! Background schedulers
//!
//! Long-running timers that trigger the batch recompute.

mod recompute;

pub use recompute::RecomputeScheduler;

//! Services Layer
//!
//! Business logic over the storage layer and the pure engine. Both services
//! call the same engine functions, which is what keeps batch-persisted
//! counts and interactive results numerically identical.
//!
//! - `RecomputeService` - batch recompute of all active symbols' counts
//! - `EvaluationService` - on-demand evaluation of one symbol

pub mod evaluation_service;
pub mod recompute_service;

pub use evaluation_service::{DayClassification, EvaluationService, SymbolEvaluation};
pub use recompute_service::{CancelFlag, RecomputeService, RecomputeSummary};

use chrono::NaiveDate;
use chrono_tz::Asia::Kolkata;

/// Today's date on the Indian trading calendar.
///
/// Only default as-of resolution uses the ambient clock; everything below
/// the service entry points takes the as-of date as an explicit parameter.
pub fn ist_today() -> NaiveDate {
    chrono::Utc::now().with_timezone(&Kolkata).date_naive()
}

//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `created_at`, `last_fired`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether two timestamps fall on the same UTC calendar day.
///
/// Time-of-day rules use this as their once-per-day guard.
#[must_use]
pub fn same_day(a: Timestamp, b: Timestamp) -> bool {
    a.date_naive() == b.date_naive()
}

//! Time related utils.

use chrono::Utc;

/// DateTime is the time type used across sevencow.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Build a datetime from a unix timestamp in seconds.
///
/// Returns `None` if the timestamp is out of range.
pub fn from_timestamp(secs: i64) -> Option<DateTime> {
    chrono::DateTime::from_timestamp(secs, 0)
}

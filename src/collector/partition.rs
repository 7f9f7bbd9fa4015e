//! Date-range partitioning
//!
//! Splits a date span into the single-day buckets used to keep each
//! sub-query under the API's enumeration cap.

use chrono::{Days, NaiveDate};

/// Every calendar day from `start` to `end` inclusive, strictly ascending,
/// with no gaps or repeats.
///
/// `start > end` yields an empty sequence rather than an error; an inverted
/// range has nothing to partition.
pub fn day_buckets(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut buckets = Vec::new();
    let mut current = start;
    while current <= end {
        buckets.push(current);
        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break, // end of representable time
        }
    }
    buckets
}

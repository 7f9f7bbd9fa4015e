//! Search query construction
//!
//! A query string combines the base predicate with a date filter on one of
//! the repository date fields: `field:start..end` for a range, `field:day`
//! for a single-day bucket. Built once per sub-query, never mutated.

use chrono::NaiveDate;

use crate::DateField;

/// An immutable search query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Base predicate filtered to a date range, both endpoints inclusive
    pub fn ranged(base: &str, field: DateField, start: NaiveDate, end: NaiveDate) -> Self {
        Self(format!("{base} {field}:{start}..{end}"))
    }

    /// Base predicate filtered to a single day bucket
    pub fn single_day(base: &str, field: DateField, day: NaiveDate) -> Self {
        Self(format!("{base} {field}:{day}"))
    }

    /// The query string as sent to the API
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

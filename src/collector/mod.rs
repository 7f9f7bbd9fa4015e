//! Collection orchestration
//!
//! The [`Collector`] is the top-level control flow: probe the total match
//! count for the full-range query; if it fits under the API's enumeration
//! cap, paginate the full-range query directly; otherwise split the range
//! into single-day buckets and paginate each bucket in ascending date order,
//! concatenating results in that order.
//!
//! Day buckets are mutually exclusive on the date field, so concatenation
//! cannot double-count. A bucket whose own true count exceeds the cap is
//! still truncated at the cap by the API; the collector warns when it sees a
//! bucket come back at or above the cap, and does not recurse into sub-day
//! partitioning.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::fetcher::{FetchConfig, FetcherError, PageFetcher, SearchTransport};
use crate::{DateField, Repository};

pub mod partition;
pub mod query;

pub use partition::day_buckets;
pub use query::SearchQuery;

/// Hard ceiling on the number of results the search API will enumerate for
/// any single query, regardless of page size.
pub const ENUMERATION_CAP: u64 = 1000;

/// Default number of retries when [`FailurePolicy::Retry`] is selected.
/// 5 retries with exponential backoff recovers from transient failures while
/// keeping the worst-case wait around a minute.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Initial retry backoff in milliseconds
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Backoff ceiling in milliseconds
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Exponential backoff delay for the given retry attempt (0-indexed)
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(retry_count));
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}

/// What the orchestrator does when a sub-query fails mid-pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the failure, aborting the run
    Abort,
    /// Keep the partial records for the failed sub-query, log a warning, and
    /// continue with the next sub-query
    Skip,
    /// Re-fetch the failed sub-query from its first page, with exponential
    /// backoff, up to the given number of retries; abort when exhausted
    Retry(u32),
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            "retry" => Ok(FailurePolicy::Retry(DEFAULT_MAX_RETRIES)),
            _ => Err(format!(
                "Invalid failure policy: {s}. Valid options: abort, skip, retry"
            )),
        }
    }
}

/// Collector settings
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Pagination settings passed to each [`PageFetcher`] invocation
    pub fetch: FetchConfig,
    /// Sub-query failure policy
    pub policy: FailurePolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            policy: FailurePolicy::Retry(DEFAULT_MAX_RETRIES),
        }
    }
}

/// Collection errors
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The count probe on the full-range query failed
    #[error("count probe failed: {0}")]
    Probe(#[source] FetcherError),

    /// A sub-query failed and the failure policy did not absorb it
    #[error("sub-query '{query}' failed: {source}")]
    SubQuery {
        /// The query string that failed
        query: String,
        /// The underlying transport failure
        source: FetcherError,
    },
}

/// Top-level collection orchestrator.
///
/// Owns the accumulated result set for the duration of one
/// [`collect`](Collector::collect) call and hands it off on completion.
pub struct Collector<T: SearchTransport> {
    transport: T,
    config: CollectorConfig,
}

impl<T: SearchTransport> Collector<T> {
    /// Create a collector over the given transport
    pub fn new(transport: T, config: CollectorConfig) -> Self {
        Self { transport, config }
    }

    /// Collect every repository matching `base` within the date span,
    /// both endpoints inclusive.
    ///
    /// Issues one count probe on the full-range query, then either paginates
    /// it directly (count within the cap) or fetches one sub-query per
    /// calendar day in ascending order, concatenating results in day order.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Probe`] if the count probe fails, or
    /// [`CollectError::SubQuery`] when a sub-query fails and the configured
    /// [`FailurePolicy`] does not absorb the failure.
    pub async fn collect(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: DateField,
    ) -> Result<Vec<Repository>, CollectError> {
        let full_range = SearchQuery::ranged(base, field, start, end);
        info!(query = %full_range, "search query");

        let total = self
            .transport
            .repository_count(full_range.as_str())
            .await
            .map_err(CollectError::Probe)?;
        info!(total, "total results");

        if total <= ENUMERATION_CAP {
            return self.fetch_sub_query(&full_range).await;
        }

        info!(
            total,
            cap = ENUMERATION_CAP,
            "result count exceeds enumeration cap, partitioning by day"
        );

        let mut results: Vec<Repository> = Vec::new();
        for day in day_buckets(start, end) {
            let sub_query = SearchQuery::single_day(base, field, day);
            let records = self.fetch_sub_query(&sub_query).await?;

            if records.len() as u64 >= ENUMERATION_CAP {
                warn!(
                    query = %sub_query,
                    records = records.len(),
                    "day bucket reached the enumeration cap, results may be truncated"
                );
            }

            info!(day = %day, records = records.len(), total = results.len() + records.len(), "bucket complete");
            results.extend(records);
        }

        Ok(results)
    }

    /// Paginate one sub-query to exhaustion, applying the failure policy
    async fn fetch_sub_query(&self, query: &SearchQuery) -> Result<Vec<Repository>, CollectError> {
        let fetcher = PageFetcher::new(&self.transport, self.config.fetch.clone());
        let mut attempt: u32 = 0;

        loop {
            match fetcher.fetch_all(query.as_str()).await {
                Ok(records) => return Ok(records),
                Err(failure) => match self.config.policy {
                    FailurePolicy::Abort => {
                        return Err(CollectError::SubQuery {
                            query: query.to_string(),
                            source: failure.source,
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!(
                            query = %query,
                            collected = failure.collected.len(),
                            "sub-query failed, keeping partial results: {}",
                            failure.source
                        );
                        return Ok(failure.collected);
                    }
                    FailurePolicy::Retry(max_retries) => {
                        if attempt >= max_retries {
                            return Err(CollectError::SubQuery {
                                query: query.to_string(),
                                source: failure.source,
                            });
                        }
                        let backoff = calculate_backoff(attempt);
                        warn!(
                            query = %query,
                            attempt = attempt + 1,
                            max_retries,
                            backoff_ms = backoff.as_millis() as u64,
                            "sub-query failed, retrying: {}",
                            failure.source
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                    }
                },
            }
        }
    }
}

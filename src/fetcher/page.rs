//! Cursor pagination to exhaustion
//!
//! One [`PageFetcher::fetch_all`] call drains every page of a single search
//! query: request a page, append its nodes, and repeat with the returned
//! cursor until the API reports no further pages. An explicit loop carries
//! the cursor and accumulator, so call depth stays flat no matter how many
//! pages a query has.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::fetcher::{
    FetcherError, ResultPage, SearchTransport, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::Repository;

/// Pagination settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Nodes requested per page. Clamped to the API ceiling of
    /// [`MAX_PAGE_SIZE`].
    pub page_size: u32,
    /// Fixed delay between consecutive pages of one query, to avoid tripping
    /// secondary rate limits. Applied only when another page follows.
    pub page_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_millis(1000),
        }
    }
}

impl FetchConfig {
    /// Effective page size after applying the API ceiling
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// A pagination failure, carrying whatever was collected before the failing
/// request so the caller can decide what to do with the partial data.
#[derive(Debug, thiserror::Error)]
#[error("page fetch failed after {} records: {source}", .collected.len())]
pub struct PageFailure {
    /// Records accumulated before the failure, in page order
    pub collected: Vec<Repository>,
    /// The underlying transport failure
    pub source: FetcherError,
}

/// Drives cursor pagination over a [`SearchTransport`]
pub struct PageFetcher<'a, T: SearchTransport + ?Sized> {
    transport: &'a T,
    config: FetchConfig,
}

impl<'a, T: SearchTransport + ?Sized> PageFetcher<'a, T> {
    /// Create a fetcher over the given transport
    pub fn new(transport: &'a T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch every page of `query`, returning all matched records in page
    /// order.
    ///
    /// After each page the current rate-limit quota is fetched and logged;
    /// it never affects pacing beyond the fixed inter-page delay. The loop
    /// terminates the moment the API reports `has_next_page == false`.
    ///
    /// # Errors
    ///
    /// Returns [`PageFailure`] on the first transport failure, carrying the
    /// records collected up to that point.
    pub async fn fetch_all(&self, query: &str) -> Result<Vec<Repository>, PageFailure> {
        let first = self.config.effective_page_size();
        let mut collected: Vec<Repository> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_number = 0usize;

        loop {
            page_number += 1;

            let page: ResultPage = match self
                .transport
                .search_page(query, first, cursor.as_deref())
                .await
            {
                Ok(page) => page,
                Err(source) => {
                    return Err(PageFailure { collected, source });
                }
            };

            debug!(
                query,
                page_number,
                nodes = page.nodes.len(),
                has_next_page = page.has_next_page,
                end_cursor = ?page.end_cursor,
                "fetched page"
            );

            collected.extend(page.nodes);
            info!(query, total = collected.len(), "extracted results so far");

            // Quota observation only; a failed snapshot is not a failed page.
            match self.transport.rate_limit().await {
                Ok(status) => debug!(
                    limit = status.limit,
                    cost = status.cost,
                    remaining = status.remaining,
                    used = status.used,
                    reset_at = %status.reset_at,
                    "rate limit status"
                ),
                Err(e) => warn!("rate limit probe failed: {e}"),
            }

            if !page.has_next_page {
                break;
            }

            cursor = page.end_cursor;
            tokio::time::sleep(self.config.page_delay).await;
        }

        debug!(
            query,
            pages = page_number,
            total = collected.len(),
            "pagination complete"
        );

        Ok(collected)
    }
}

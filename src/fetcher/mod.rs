//! GraphQL transport and cursor pagination
//!
//! The transport seam is the [`SearchTransport`] trait: one implementation
//! ([`GithubClient`]) talks to the real GraphQL endpoint, tests substitute
//! scripted mocks. [`PageFetcher`] drives cursor pagination over any
//! transport.

use async_trait::async_trait;

use crate::Repository;

pub mod graphql;
pub mod page;

pub use graphql::GithubClient;
pub use page::{FetchConfig, PageFetcher, PageFailure};

/// Default number of nodes requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard per-page ceiling imposed by the search API
pub const MAX_PAGE_SIZE: u32 = 100;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Network-level failure (DNS, connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// Error reported in the GraphQL response envelope
    /// (bad credentials, abuse detection, malformed query)
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// One page of search results: the matched nodes plus pagination state.
///
/// The cursor is opaque and meaningful only to the API; it is echoed back
/// verbatim to request the following page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Matched repository nodes, in API order
    pub nodes: Vec<Repository>,
    /// Whether another page exists after this one
    pub has_next_page: bool,
    /// Cursor positioned after the last node, absent on an empty page
    pub end_cursor: Option<String>,
}

/// Rate-limit quota snapshot, observed after each page fetch.
///
/// Informational only: the engine logs it but paces itself with a fixed
/// inter-page delay rather than adapting to these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    /// Quota ceiling per window
    pub limit: u64,
    /// Cost of the last request
    pub cost: u64,
    /// Remaining quota in the current window
    pub remaining: u64,
    /// Quota consumed in the current window
    pub used: u64,
    /// Window reset time
    pub reset_at: chrono::DateTime<chrono::Utc>,
}

/// Transport over the search API: one method per wire request shape.
///
/// Every call consumes one credential from the token pool.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Fetch one page of up to `first` repositories matching `query`,
    /// starting after `after` (absent for the first page).
    async fn search_page(
        &self,
        query: &str,
        first: u32,
        after: Option<&str>,
    ) -> FetcherResult<ResultPage>;

    /// Total number of repositories matching `query`, with no page
    /// materialization. This is the count probe.
    async fn repository_count(&self, query: &str) -> FetcherResult<u64>;

    /// Current rate-limit quota snapshot.
    async fn rate_limit(&self) -> FetcherResult<RateLimitStatus>;
}

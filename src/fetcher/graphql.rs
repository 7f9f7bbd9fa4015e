//! GitHub GraphQL client
//!
//! Implements [`SearchTransport`] against the `https://api.github.com/graphql`
//! endpoint with three request shapes: search-page, search-count, and
//! rate-limit. The bearer token for every request comes from the
//! [`TokenRotator`], consulted once per request.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::fetcher::{
    FetcherError, FetcherResult, RateLimitStatus, ResultPage, SearchTransport,
};
use crate::token::TokenRotator;
use crate::Repository;

/// GraphQL endpoint all three request shapes go to
pub const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Search-page query: up to `first` repository nodes after `after`,
/// plus pagination state.
const SEARCH_PAGE_QUERY: &str = r#"query ($searchQuery: String!, $first: Int, $after: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $first, after: $after) {
    nodes {
      ... on Repository {
        nameWithOwner
        description
        url
        createdAt
        assignableUsers { totalCount }
        watchers { totalCount }
        stargazerCount
        forkCount
        projects { totalCount }
        issues { totalCount }
        pullRequests { totalCount }
        diskUsage
        licenseInfo { spdxId }
        languages(first: 5) { edges { node { name } } }
        primaryLanguage { name }
        environments(first: 5) { edges { node { name } } }
        submodules(first: 5) { edges { node { name } } }
        repositoryTopics(first: 5) { edges { node { topic { name } } } }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

/// Search-count query: total match count only, no node materialization
const SEARCH_COUNT_QUERY: &str = r#"query ($searchQuery: String!) {
  search(query: $searchQuery, type: REPOSITORY, first: 1) {
    repositoryCount
  }
}"#;

/// Rate-limit query: quota snapshot for the current token
const RATE_LIMIT_QUERY: &str = r#"query {
  rateLimit {
    limit
    cost
    remaining
    used
    resetAt
  }
}"#;

/// GitHub GraphQL API client with token rotation
pub struct GithubClient {
    client: Client,
    endpoint: String,
    rotator: TokenRotator,
}

impl GithubClient {
    /// Create a client against the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(rotator: TokenRotator) -> FetcherResult<Self> {
        Self::with_endpoint(rotator, GRAPHQL_ENDPOINT)
    }

    /// Create a client against a custom endpoint, e.g. a GitHub Enterprise
    /// instance.
    pub fn with_endpoint(rotator: TokenRotator, endpoint: impl Into<String>) -> FetcherResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("repo-harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetcherError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            rotator,
        })
    }

    /// Execute one GraphQL request and unwrap the response envelope.
    ///
    /// Consumes one token from the pool. GraphQL reports request-level
    /// failures (bad credentials, abuse detection, malformed query) inside a
    /// 200 response, so the envelope's `errors` array is checked before
    /// `data` is touched.
    async fn execute<T>(&self, query: &str, variables: serde_json::Value) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        let token = self.rotator.next();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetcherError::Http(format!("{status}: {body}")));
        }

        let envelope: GraphqlEnvelope<T> = response
            .json()
            .await
            .map_err(|e| FetcherError::Parse(e.to_string()))?;

        if let Some(errors) = envelope.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(FetcherError::Api(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| FetcherError::Parse("response has neither data nor errors".to_string()))
    }
}

#[async_trait::async_trait]
impl SearchTransport for GithubClient {
    async fn search_page(
        &self,
        query: &str,
        first: u32,
        after: Option<&str>,
    ) -> FetcherResult<ResultPage> {
        debug!(query, first, ?after, "requesting search page");

        let data: SearchPageData = self
            .execute(
                SEARCH_PAGE_QUERY,
                json!({ "searchQuery": query, "first": first, "after": after }),
            )
            .await?;

        let nodes = data.search.nodes.iter().map(Repository::from).collect();
        Ok(ResultPage {
            nodes,
            has_next_page: data.search.page_info.has_next_page,
            end_cursor: data.search.page_info.end_cursor,
        })
    }

    async fn repository_count(&self, query: &str) -> FetcherResult<u64> {
        debug!(query, "requesting repository count");

        let data: SearchCountData = self
            .execute(SEARCH_COUNT_QUERY, json!({ "searchQuery": query }))
            .await?;

        Ok(data.search.repository_count)
    }

    async fn rate_limit(&self) -> FetcherResult<RateLimitStatus> {
        let data: RateLimitData = self.execute(RATE_LIMIT_QUERY, json!({})).await?;
        Ok(data.rate_limit)
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchPageData {
    search: SearchPage,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    nodes: Vec<RepositoryNode>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct SearchCountData {
    search: SearchCount,
}

#[derive(Debug, Deserialize)]
struct SearchCount {
    #[serde(rename = "repositoryCount")]
    repository_count: u64,
}

#[derive(Debug, Deserialize)]
struct RateLimitData {
    #[serde(rename = "rateLimit")]
    rate_limit: RateLimitStatus,
}

/// Raw repository node as it appears on the wire. Count and list fields are
/// nullable on the API side, so everything nested defaults when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name_with_owner: String,
    description: Option<String>,
    url: String,
    created_at: String,
    #[serde(default)]
    assignable_users: TotalCount,
    #[serde(default)]
    watchers: TotalCount,
    #[serde(default)]
    stargazer_count: u64,
    #[serde(default)]
    fork_count: u64,
    #[serde(default)]
    projects: TotalCount,
    #[serde(default)]
    issues: TotalCount,
    #[serde(default)]
    pull_requests: TotalCount,
    #[serde(default)]
    disk_usage: Option<u64>,
    license_info: Option<LicenseInfo>,
    #[serde(default)]
    languages: NamedEdges,
    primary_language: Option<NamedNode>,
    #[serde(default)]
    environments: NamedEdges,
    #[serde(default)]
    submodules: NamedEdges,
    #[serde(default)]
    repository_topics: TopicEdges,
}

#[derive(Debug, Default, Deserialize)]
struct TotalCount {
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    #[serde(rename = "spdxId")]
    spdx_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedEdges {
    #[serde(default)]
    edges: Vec<NamedEdge>,
}

#[derive(Debug, Deserialize)]
struct NamedEdge {
    node: NamedNode,
}

#[derive(Debug, Deserialize)]
struct NamedNode {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct TopicEdges {
    #[serde(default)]
    edges: Vec<TopicEdge>,
}

#[derive(Debug, Deserialize)]
struct TopicEdge {
    node: TopicNode,
}

#[derive(Debug, Deserialize)]
struct TopicNode {
    topic: NamedNode,
}

impl From<&RepositoryNode> for Repository {
    fn from(node: &RepositoryNode) -> Self {
        Self {
            name_with_owner: node.name_with_owner.clone(),
            description: node.description.clone(),
            url: node.url.clone(),
            created_at: node.created_at.clone(),
            assignable_users: node.assignable_users.total_count,
            watchers: node.watchers.total_count,
            stars: node.stargazer_count,
            forks: node.fork_count,
            projects: node.projects.total_count,
            issues: node.issues.total_count,
            pull_requests: node.pull_requests.total_count,
            disk_usage: node.disk_usage.unwrap_or(0),
            license: node
                .license_info
                .as_ref()
                .and_then(|l| l.spdx_id.clone()),
            languages: node
                .languages
                .edges
                .iter()
                .map(|e| e.node.name.clone())
                .collect(),
            primary_language: node.primary_language.as_ref().map(|l| l.name.clone()),
            environments: node
                .environments
                .edges
                .iter()
                .map(|e| e.node.name.clone())
                .collect(),
            submodules: node
                .submodules
                .edges
                .iter()
                .map(|e| e.node.name.clone())
                .collect(),
            topics: node
                .repository_topics
                .edges
                .iter()
                .map(|e| e.node.topic.name.clone())
                .collect(),
        }
    }
}

//! Scripted transport shared by pagination and collection tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use repo_harvester::fetcher::{
    FetcherError, FetcherResult, RateLimitStatus, ResultPage, SearchTransport,
};
use repo_harvester::Repository;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One observed transport call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Count probe with the query string
    Count(String),
    /// Page fetch with query, page size, and cursor
    Page {
        query: String,
        first: u32,
        after: Option<String>,
    },
    /// Rate-limit snapshot
    RateLimit,
}

/// Transport whose responses are scripted per query string.
///
/// Page responses are queued per query; each `search_page` call pops the
/// next queued response for its query. All calls are recorded for
/// assertions.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    count: Arc<Mutex<u64>>,
    fail_count_probe: Arc<Mutex<bool>>,
    pages: Arc<Mutex<HashMap<String, VecDeque<FetcherResult<ResultPage>>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedTransport {
    pub fn new(count: u64) -> Self {
        let transport = Self::default();
        *transport.count.lock().unwrap() = count;
        transport
    }

    /// Make the next count probe fail with an API error
    pub fn fail_count_probe(&self) {
        *self.fail_count_probe.lock().unwrap() = true;
    }

    /// Queue the responses returned for successive pages of `query`
    pub fn script_pages(&self, query: &str, pages: Vec<FetcherResult<ResultPage>>) {
        self.pages
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .extend(pages);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Queries of page fetches, in call order
    pub fn page_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Page { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn count_probes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Count(_)))
            .count()
    }
}

#[async_trait]
impl SearchTransport for ScriptedTransport {
    async fn search_page(
        &self,
        query: &str,
        first: u32,
        after: Option<&str>,
    ) -> FetcherResult<ResultPage> {
        self.calls.lock().unwrap().push(Call::Page {
            query: query.to_string(),
            first,
            after: after.map(String::from),
        });

        self.pages
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(FetcherError::Api(format!("unscripted query: {query}"))))
    }

    async fn repository_count(&self, query: &str) -> FetcherResult<u64> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Count(query.to_string()));
        if *self.fail_count_probe.lock().unwrap() {
            return Err(FetcherError::Api("Bad credentials".to_string()));
        }
        Ok(*self.count.lock().unwrap())
    }

    async fn rate_limit(&self) -> FetcherResult<RateLimitStatus> {
        self.calls.lock().unwrap().push(Call::RateLimit);
        Ok(RateLimitStatus {
            limit: 5000,
            cost: 1,
            remaining: 4999,
            used: 1,
            reset_at: Utc.with_ymd_and_hms(2023, 4, 1, 13, 0, 0).unwrap(),
        })
    }
}

/// A minimal repository node with a distinguishing slug
pub fn repo(slug: &str) -> Repository {
    Repository {
        name_with_owner: slug.to_string(),
        description: None,
        url: format!("https://github.com/{slug}"),
        created_at: "2023-04-01T00:00:00Z".to_string(),
        assignable_users: 0,
        watchers: 0,
        stars: 0,
        forks: 0,
        projects: 0,
        issues: 0,
        pull_requests: 0,
        disk_usage: 0,
        license: None,
        languages: vec![],
        primary_language: None,
        environments: vec![],
        submodules: vec![],
        topics: vec![],
    }
}

/// A batch of `count` nodes named after `prefix`
pub fn repos(prefix: &str, count: usize) -> Vec<Repository> {
    (0..count).map(|i| repo(&format!("{prefix}/{i}"))).collect()
}

/// A page with the given nodes and pagination state
pub fn page(nodes: Vec<Repository>, has_next_page: bool, end_cursor: Option<&str>) -> ResultPage {
    ResultPage {
        nodes,
        has_next_page,
        end_cursor: end_cursor.map(String::from),
    }
}

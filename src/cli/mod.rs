//! CLI command implementation

use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::collector::{CollectError, Collector, CollectorConfig, FailurePolicy};
use crate::enrich::{enrich, EnrichError, TagDictionary};
use crate::fetcher::{FetchConfig, FetcherError, GithubClient, MAX_PAGE_SIZE};
use crate::output::{write_csv_report, write_json_report, OutputError};
use crate::token::{TokenError, TokenRotator};
use crate::{DateField, RepoRecord};

/// Environment variable holding a comma-separated token pool, used when no
/// `--token` flag is given
pub const TOKENS_ENV: &str = "GITHUB_TOKENS";

/// Dictionary file picked up automatically when present
const DEFAULT_DICTIONARY: &str = "dictionary.json";

/// Parse and validate the page size against the API ceiling
fn parse_page_size(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("page size must be at least 1".to_string());
    }
    if value > MAX_PAGE_SIZE {
        return Err(format!("page size {value} exceeds API maximum of {MAX_PAGE_SIZE}"));
    }
    Ok(value)
}

/// Repo Harvester CLI
#[derive(Parser, Debug)]
#[command(name = "repo-harvester")]
#[command(about = "Harvest GitHub repository metadata past the search API's 1000-result cap", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output file base name; writes <filename>.json and <filename>.csv
    #[arg(long, default_value = "results")]
    pub filename: String,

    /// Search predicate, combined with the date filter
    #[arg(long, default_value = "mobile AND (android OR ios)")]
    pub query: String,

    /// Start date (YYYY-MM-DD), inclusive
    #[arg(long, default_value = "2013-01-01")]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD), inclusive; defaults to today (UTC)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Repository date field to filter on: created, pushed, or updated
    #[arg(long, default_value = "created")]
    pub date_field: DateField,

    /// Results requested per page (API maximum: 100)
    #[arg(long, default_value = "50", value_parser = parse_page_size)]
    pub page_size: u32,

    /// Fixed delay between pages of one query, in milliseconds
    #[arg(long, default_value = "1000")]
    pub page_delay_ms: u64,

    /// What to do when a sub-query fails: abort, skip, or retry
    #[arg(long, default_value = "retry")]
    pub on_error: FailurePolicy,

    /// Number of retries per sub-query when --on-error is retry
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(0..=20))]
    pub max_retries: u32,

    /// Personal access token; repeat the flag to build a rotation pool.
    /// Falls back to the GITHUB_TOKENS environment variable
    /// (comma-separated) when not given.
    #[arg(long = "token")]
    pub tokens: Vec<String>,

    /// Tag dictionary for enrichment; when omitted, ./dictionary.json is
    /// used if it exists
    #[arg(long)]
    pub dictionary: Option<PathBuf>,
}

impl Cli {
    /// Resolve the token pool from flags or the environment
    fn resolve_tokens(&self) -> Result<Vec<String>, CliError> {
        if !self.tokens.is_empty() {
            return Ok(self.tokens.clone());
        }

        let from_env: Vec<String> = std::env::var(TOKENS_ENV)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        if from_env.is_empty() {
            return Err(CliError::Configuration(format!(
                "no tokens provided: pass --token or set {TOKENS_ENV}"
            )));
        }
        Ok(from_env)
    }

    /// Dictionary path to use, if any: the explicit flag, or the default
    /// file when it exists
    fn dictionary_path(&self) -> Option<PathBuf> {
        match &self.dictionary {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_DICTIONARY);
                default.exists().then(|| default.to_path_buf())
            }
        }
    }

    /// Failure policy with the retry count from --max-retries applied
    fn failure_policy(&self) -> FailurePolicy {
        match self.on_error {
            FailurePolicy::Retry(_) => FailurePolicy::Retry(self.max_retries),
            policy => policy,
        }
    }

    /// Run the collection end to end: collect, enrich, write.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] on configuration, collection, enrichment, or
    /// output failures.
    pub async fn execute(&self) -> Result<(), CliError> {
        let rotator = TokenRotator::new(self.resolve_tokens()?)?;
        info!(pool_size = rotator.pool_size(), "token pool ready");

        let client = GithubClient::new(rotator)?;
        let config = CollectorConfig {
            fetch: FetchConfig {
                page_size: self.page_size,
                page_delay: std::time::Duration::from_millis(self.page_delay_ms),
            },
            policy: self.failure_policy(),
        };
        let collector = Collector::new(client, config);

        let end = self.end.unwrap_or_else(|| Utc::now().date_naive());
        let repositories = collector
            .collect(&self.query, self.start, end, self.date_field)
            .await?;
        info!(total = repositories.len(), "fetched results");

        let mut records: Vec<RepoRecord> = repositories.iter().map(RepoRecord::from).collect();

        if let Some(path) = self.dictionary_path() {
            let dictionary = TagDictionary::load(&path)?;
            enrich(&mut records, &dictionary);
        }

        write_json_report(format!("{}.json", self.filename), &records)?;
        write_csv_report(format!("{}.csv", self.filename), &records)?;

        Ok(())
    }
}

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Token pool error
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Collection error
    #[error("collection error: {0}")]
    Collect(#[from] CollectError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Enrichment error
    #[error("enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

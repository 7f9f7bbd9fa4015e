//! # Repo Harvester Library
//!
//! A library for harvesting repository metadata from the GitHub GraphQL search
//! API. Designed for mining-software-repositories research and dataset building.
//!
//! ## Features
//!
//! - **Cap-Aware Collection**: The search API refuses to enumerate more than
//!   1000 results per query; queries over the cap are automatically split into
//!   single-day sub-queries that each fit under it
//! - **Cursor Pagination**: Each sub-query is paginated to exhaustion with
//!   opaque cursors and a fixed inter-page delay
//! - **Token Rotation**: Requests round-robin across a pool of personal access
//!   tokens to spread rate-limit consumption
//! - **Typed Failures**: A failed sub-query surfaces its cause together with
//!   the records collected before the failure, so the orchestrator can retry,
//!   skip, or abort
//! - **JSON + CSV Output**: Flattened records written as a JSON array and a
//!   CSV file with a stable header
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_harvester::collector::{Collector, CollectorConfig};
//! use repo_harvester::fetcher::GithubClient;
//! use repo_harvester::token::TokenRotator;
//! use repo_harvester::DateField;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rotator = TokenRotator::new(vec!["ghp_token".to_string()])?;
//! let client = GithubClient::new(rotator)?;
//! let collector = Collector::new(client, CollectorConfig::default());
//!
//! let records = collector
//!     .collect(
//!         "mobile AND (android OR ios)",
//!         NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
//!         DateField::Created,
//!     )
//!     .await?;
//! println!("collected {} repositories", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`token`] - Token pool rotation
//! - [`fetcher`] - GraphQL transport and cursor pagination
//! - [`collector`] - Count probing, date partitioning, and orchestration
//! - [`output`] - JSON and CSV writers
//! - [`enrich`] - Optional tag-dictionary enrichment as a post-processing stage
//! - [`cli`] - Command-line interface

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CLI command implementation
pub mod cli;

/// Collection orchestration
pub mod collector;

/// Tag-dictionary enrichment
pub mod enrich;

/// GraphQL transport and pagination
pub mod fetcher;

/// Output writers
pub mod output;

/// Token pool rotation
pub mod token;

// Re-export commonly used types
pub use collector::Collector;
pub use token::TokenRotator;

/// A repository record as returned by the search API, normalized from the
/// GraphQL response shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    /// Full "owner/name" slug
    pub name_with_owner: String,
    /// Repository description, if any
    pub description: Option<String>,
    /// HTML URL
    pub url: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Number of assignable users (collaborators)
    pub assignable_users: u64,
    /// Number of watchers
    pub watchers: u64,
    /// Number of stargazers
    pub stars: u64,
    /// Number of forks
    pub forks: u64,
    /// Number of projects
    pub projects: u64,
    /// Number of issues
    pub issues: u64,
    /// Number of pull requests
    pub pull_requests: u64,
    /// Disk usage in kilobytes
    pub disk_usage: u64,
    /// SPDX license identifier, if any
    pub license: Option<String>,
    /// Up to 5 languages
    pub languages: Vec<String>,
    /// Primary language, if any
    pub primary_language: Option<String>,
    /// Up to 5 deployment environments
    pub environments: Vec<String>,
    /// Up to 5 git submodules
    pub submodules: Vec<String>,
    /// Up to 5 repository topics
    pub topics: Vec<String>,
}

/// A flattened output row derived from a [`Repository`], with the slug split
/// into owner and name, the timestamp truncated to a date, and list fields
/// joined for CSV compatibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoRecord {
    /// Repository name (slug after the slash)
    pub name: String,
    /// Repository owner (slug before the slash)
    pub owner: String,
    /// Description, empty string when absent
    pub description: String,
    /// HTML URL
    pub url: String,
    /// Creation date (YYYY-MM-DD)
    pub created_at: String,
    /// Number of assignable users
    pub users: u64,
    /// Number of watchers
    pub watchers: u64,
    /// Number of stargazers
    pub stars: u64,
    /// Number of forks
    pub forks: u64,
    /// Number of projects
    pub projects: u64,
    /// Number of issues
    pub issues: u64,
    /// Number of pull requests
    pub pull_requests: u64,
    /// Disk usage in kilobytes
    pub disk_usage: u64,
    /// SPDX license identifier, empty string when absent
    pub license: String,
    /// Languages, semicolon-joined
    pub languages: String,
    /// Primary language, empty string when absent
    pub primary_language: String,
    /// Environments, semicolon-joined
    pub environments: String,
    /// Submodules, semicolon-joined
    pub submodules: String,
    /// Topics, semicolon-joined
    pub topics: String,
    /// Dictionary tags found in name/description but missing from topics.
    /// Only populated when an enrichment dictionary was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// Separator used when joining list fields into a single CSV cell
pub const LIST_SEPARATOR: &str = ";";

impl From<&Repository> for RepoRecord {
    fn from(repo: &Repository) -> Self {
        let (owner, name) = match repo.name_with_owner.split_once('/') {
            Some((owner, name)) => (owner.to_string(), name.to_string()),
            None => (String::new(), repo.name_with_owner.clone()),
        };

        // "2023-04-01T12:34:56Z" -> "2023-04-01"
        let created_at = repo
            .created_at
            .split_once('T')
            .map(|(date, _)| date.to_string())
            .unwrap_or_else(|| repo.created_at.clone());

        Self {
            name,
            owner,
            description: repo.description.clone().unwrap_or_default(),
            url: repo.url.clone(),
            created_at,
            users: repo.assignable_users,
            watchers: repo.watchers,
            stars: repo.stars,
            forks: repo.forks,
            projects: repo.projects,
            issues: repo.issues,
            pull_requests: repo.pull_requests,
            disk_usage: repo.disk_usage,
            license: repo.license.clone().unwrap_or_default(),
            languages: repo.languages.join(LIST_SEPARATOR),
            primary_language: repo.primary_language.clone().unwrap_or_default(),
            environments: repo.environments.join(LIST_SEPARATOR),
            submodules: repo.submodules.join(LIST_SEPARATOR),
            topics: repo.topics.join(LIST_SEPARATOR),
            extra: None,
        }
    }
}

impl RepoRecord {
    /// Topics as the list the record was built from
    pub fn topic_list(&self) -> Vec<&str> {
        if self.topics.is_empty() {
            Vec::new()
        } else {
            self.topics.split(LIST_SEPARATOR).collect()
        }
    }
}

/// Repository date field used to scope a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateField {
    /// Filter on repository creation date
    #[serde(rename = "created")]
    Created,
    /// Filter on last push date
    #[serde(rename = "pushed")]
    Pushed,
    /// Filter on last update date
    #[serde(rename = "updated")]
    Updated,
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DateField::Created => "created",
            DateField::Pushed => "pushed",
            DateField::Updated => "updated",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(DateField::Created),
            "pushed" => Ok(DateField::Pushed),
            "updated" => Ok(DateField::Updated),
            _ => Err(format!("Invalid date field: {s}")),
        }
    }
}

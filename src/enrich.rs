//! Tag-dictionary enrichment
//!
//! A post-processing stage over the collected records: given a static tag
//! dictionary, each record gains an `extra` value listing the dictionary
//! tags that appear in its name or description but are missing from its
//! topics. The stage is pure over its inputs; loading the dictionary file
//! is the caller's concern, so the collection engine itself never touches
//! the filesystem.

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::{RepoRecord, LIST_SEPARATOR};

/// A static dictionary of lowercase tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDictionary {
    tags: Vec<String>,
}

/// Dictionary file entry: `[{ "tag": "android" }, ...]`
#[derive(Debug, Deserialize)]
struct TagEntry {
    tag: String,
}

/// Enrichment errors
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Dictionary file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// Dictionary file did not parse as a tag array
    #[error("parse error: {0}")]
    Parse(String),
}

impl TagDictionary {
    /// Build a dictionary from raw tags, normalized to lowercase
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(|t| t.into().to_lowercase()).collect(),
        }
    }

    /// Load a dictionary from a JSON file of `{ "tag": ... }` entries.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EnrichError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EnrichError::Io(e.to_string()))?;
        let entries: Vec<TagEntry> =
            serde_json::from_str(&content).map_err(|e| EnrichError::Parse(e.to_string()))?;

        info!(
            path = %path.as_ref().display(),
            tags = entries.len(),
            "loaded tag dictionary"
        );
        Ok(Self::from_tags(entries.into_iter().map(|e| e.tag)))
    }

    /// Number of tags in the dictionary
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags found as substrings of the record's name or description
    /// (case-insensitive) and absent from its topic list
    fn extra_tags(&self, record: &RepoRecord) -> Vec<&str> {
        let name = record.name.to_lowercase();
        let description = record.description.to_lowercase();
        let topics = record.topic_list();

        self.tags
            .iter()
            .filter(|tag| name.contains(tag.as_str()) || description.contains(tag.as_str()))
            .filter(|tag| !topics.contains(&tag.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Apply the dictionary to every record, setting `extra` on each.
///
/// Records with no matching tags get an empty `extra` rather than none, so
/// enriched output has a uniform column set.
pub fn enrich(records: &mut [RepoRecord], dictionary: &TagDictionary) {
    for record in records.iter_mut() {
        record.extra = Some(dictionary.extra_tags(record).join(LIST_SEPARATOR));
    }
}

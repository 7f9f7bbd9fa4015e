//! CSV output writer

use csv::WriterBuilder;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::{OutputError, OutputResult};
use crate::RepoRecord;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Base column set shared by every report
const BASE_HEADER: [&str; 20] = [
    "name",
    "owner",
    "description",
    "url",
    "created_at",
    "users",
    "watchers",
    "stars",
    "forks",
    "projects",
    "issues",
    "pull_requests",
    "disk_usage",
    "license",
    "languages",
    "primary_language",
    "environments",
    "submodules",
    "topics",
    "extra",
];

/// Write the record set as CSV.
///
/// The header is written explicitly and unconditionally, so an empty result
/// set still produces a well-formed file. The `extra` column is present only
/// when at least one record carries an enrichment value; otherwise the base
/// columns are written without it.
pub fn write_csv_report<P: AsRef<Path>>(path: P, records: &[RepoRecord]) -> OutputResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::Io(format!("Failed to create directory: {e}")))?;
        }
    }

    let file = File::create(path)
        .map_err(|e| OutputError::Io(format!("Failed to create file: {e}")))?;
    let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(buf_writer);

    let with_extra = records.iter().any(|r| r.extra.is_some());
    let header: &[&str] = if with_extra {
        &BASE_HEADER
    } else {
        &BASE_HEADER[..BASE_HEADER.len() - 1]
    };

    writer
        .write_record(header)
        .map_err(|e| OutputError::Csv(format!("Failed to write header: {e}")))?;

    for record in records {
        writer
            .write_record(row_fields(record, with_extra))
            .map_err(|e| OutputError::Csv(format!("Failed to write record: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| OutputError::Io(format!("Failed to flush: {e}")))?;

    info!(path = %path.display(), records = records.len(), "CSV file saved");
    Ok(())
}

/// Field values in [`BASE_HEADER`] order
fn row_fields(record: &RepoRecord, with_extra: bool) -> Vec<String> {
    let mut fields = vec![
        record.name.clone(),
        record.owner.clone(),
        record.description.clone(),
        record.url.clone(),
        record.created_at.clone(),
        record.users.to_string(),
        record.watchers.to_string(),
        record.stars.to_string(),
        record.forks.to_string(),
        record.projects.to_string(),
        record.issues.to_string(),
        record.pull_requests.to_string(),
        record.disk_usage.to_string(),
        record.license.clone(),
        record.languages.clone(),
        record.primary_language.clone(),
        record.environments.clone(),
        record.submodules.clone(),
        record.topics.clone(),
    ];
    if with_extra {
        fields.push(record.extra.clone().unwrap_or_default());
    }
    fields
}

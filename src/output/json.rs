//! JSON output writer

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::{OutputError, OutputResult};
use crate::RepoRecord;

/// Write the record set as a pretty-printed JSON array.
///
/// Records without an `extra` value omit the field, matching the enrichment
/// being optional.
pub fn write_json_report<P: AsRef<Path>>(path: P, records: &[RepoRecord]) -> OutputResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::Io(format!("Failed to create directory: {e}")))?;
        }
    }

    let file = File::create(path)
        .map_err(|e| OutputError::Io(format!("Failed to create file: {e}")))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, records)
        .map_err(|e| OutputError::Serialization(e.to_string()))?;

    info!(path = %path.display(), records = records.len(), "JSON file saved");
    Ok(())
}

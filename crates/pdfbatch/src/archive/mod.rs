//! Zip input and output.

pub mod ingest;
pub mod output;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::batch::BatchManager;
use crate::content::ContentStore;
use crate::error::Result;

pub use ingest::{
    check_entry_path, ingest_zip, ingest_zip_file, ingest_zip_with_limit, IngestReport,
    SkipReason, SkippedEntry, MAX_ENTRY_BYTES,
};
pub use output::ResultArchive;

/// Outcome of rebuilding a batch's result archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
    /// Results whose source document was not found in the content store.
    pub missing: Vec<String>,
}

/// Default archive name for a single batch: `Lote_<id>_<YYYYmmdd_HHMMSS>.zip`.
pub fn export_file_name(batch_id: &str, at: DateTime<Utc>) -> String {
    format!("Lote_{}_{}.zip", batch_id, at.format("%Y%m%d_%H%M%S"))
}

/// Writes each `(original_name, new_name)` pair to `output` as
/// `<new_name>.pdf`, reading the original bytes from `content`. Documents
/// missing from the store are left out and reported.
pub fn write_results<'a, I>(
    results: I,
    content: &dyn ContentStore,
    output: &Path,
) -> Result<ExportSummary>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut archive = ResultArchive::create(output)?;
    let mut missing = Vec::new();

    for (original_name, new_name) in results {
        let bytes = match content.load(original_name) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Leaving {} out of the archive: {}", new_name, e);
                missing.push(original_name.to_string());
                continue;
            }
        };
        archive.add(new_name, &bytes)?;
    }

    let entries = archive.entries().to_vec();
    archive.finish()?;

    log::info!(
        "Wrote {} ({} documents, {} missing)",
        output.display(),
        entries.len(),
        missing.len()
    );
    Ok(ExportSummary {
        path: output.to_path_buf(),
        entries,
        missing,
    })
}

/// Rebuilds the result archive of a stored batch. Returns `None` for an
/// unknown batch.
pub fn export_batch(
    manager: &BatchManager,
    id: &str,
    content: &dyn ContentStore,
    output: &Path,
) -> Result<Option<ExportSummary>> {
    let Some(batch) = manager.get_batch(id) else {
        log::debug!("export_batch: unknown batch '{}'", id);
        return Ok(None);
    };

    let results = batch
        .results()
        .iter()
        .map(|r| (r.original_name.as_str(), r.new_name.as_str()));
    write_results(results, content, output).map(Some)
}

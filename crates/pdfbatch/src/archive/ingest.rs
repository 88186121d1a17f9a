//! Reading uploaded zip archives into a content store.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::content::{admit_name, is_pdf_name, ContentStore, MemoryContentStore};
use crate::error::ArchiveError;
use crate::parser::UniqueNames;
use crate::sanitize::redact_name;

/// Why an archive entry was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AbsolutePath,
    PathTraversal,
    /// Rejected by the zip reader's own path check, e.g. an embedded NUL.
    InvalidName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AbsolutePath => write!(f, "absolute path"),
            SkipReason::PathTraversal => write!(f, "path escapes the archive root"),
            SkipReason::InvalidName => write!(f, "not a safe relative path"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: SkipReason,
}

/// Result of reading an archive.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// PDF entries keyed by base name, in archive order.
    pub content: MemoryContentStore,
    /// Entries rejected by the path check.
    pub skipped: Vec<SkippedEntry>,
    /// Directories, non-PDF files and platform metadata entries.
    pub ignored: usize,
}

/// Largest entry read into memory: 256 MiB.
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

pub fn ingest_zip_file(path: &Path) -> Result<IngestReport, ArchiveError> {
    let file = File::open(path).map_err(|e| ArchiveError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    ingest_zip(file)
}

/// Loads every PDF entry of a zip archive.
///
/// Entries with absolute paths or paths that climb out of the archive root
/// are skipped with a warning; the rest are still read. A structurally
/// broken archive, or a PDF entry larger than [`MAX_ENTRY_BYTES`], is an
/// error.
pub fn ingest_zip<R: Read + Seek>(reader: R) -> Result<IngestReport, ArchiveError> {
    ingest_zip_with_limit(reader, MAX_ENTRY_BYTES)
}

/// [`ingest_zip`] with an explicit per-entry size limit.
pub fn ingest_zip_with_limit<R: Read + Seek>(
    reader: R,
    max_entry_bytes: u64,
) -> Result<IngestReport, ArchiveError> {
    let _span = tracing::info_span!("archive.ingest").entered();

    let mut archive = zip::ZipArchive::new(reader)?;
    let mut report = IngestReport::default();
    let mut used = UniqueNames::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let raw_name = entry.name().to_string();

        let checked = check_entry_path(&raw_name).and_then(|()| {
            entry
                .enclosed_name()
                .map(|_| ())
                .ok_or(SkipReason::InvalidName)
        });
        if let Err(reason) = checked {
            tracing::warn!(entry = %raw_name, %reason, "Skipping unsafe archive entry");
            report.skipped.push(SkippedEntry {
                name: raw_name,
                reason,
            });
            continue;
        }

        let base_name = redact_name(&raw_name);
        if entry.is_dir() || is_platform_metadata(&raw_name) || !is_pdf_name(&base_name) {
            tracing::debug!(entry = %raw_name, "Ignoring archive entry");
            report.ignored += 1;
            continue;
        }

        // The declared size comes from the archive headers and is untrusted.
        if entry.size() > max_entry_bytes {
            return Err(ArchiveError::EntryTooLarge {
                name: raw_name,
                size: entry.size(),
                limit: max_entry_bytes,
            });
        }

        let mut bytes = Vec::new();
        (&mut entry)
            .take(max_entry_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::ReadEntry {
                name: raw_name.clone(),
                source: e,
            })?;
        if bytes.len() as u64 > max_entry_bytes {
            return Err(ArchiveError::EntryTooLarge {
                name: raw_name,
                size: bytes.len() as u64,
                limit: max_entry_bytes,
            });
        }

        let name = admit_name(&mut used, &base_name);
        report.content.insert(name, bytes);
    }

    tracing::info!(
        documents = report.content.len(),
        skipped = report.skipped.len(),
        ignored = report.ignored,
        "Archive ingested"
    );
    Ok(report)
}

/// Lexically resolves `name` against the archive root.
pub fn check_entry_path(name: &str) -> Result<(), SkipReason> {
    if name.starts_with('/') || name.starts_with('\\') || has_drive_prefix(name) {
        return Err(SkipReason::AbsolutePath);
    }

    let mut depth: usize = 0;
    for component in name.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                depth = depth.checked_sub(1).ok_or(SkipReason::PathTraversal)?;
            }
            _ => depth += 1,
        }
    }
    Ok(())
}

fn has_drive_prefix(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

fn is_platform_metadata(name: &str) -> bool {
    name.split(['/', '\\'])
        .any(|c| c == "__MACOSX" || c.starts_with("._"))
}

//! Writing renamed documents into a zip archive.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::parser::UniqueNames;

/// Deflate-compressed archive of renamed documents.
///
/// Entry names are `<stem>.pdf`; a stem that was already written gets a
/// numeric suffix instead of overwriting the earlier entry.
pub struct ResultArchive<W: Write + Seek> {
    writer: ZipWriter<W>,
    names: UniqueNames,
    entries: Vec<String>,
}

impl ResultArchive<File> {
    pub fn create(path: &Path) -> Result<Self, ArchiveError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ArchiveError::Open {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(path).map_err(|e| ArchiveError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> ResultArchive<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ZipWriter::new(writer),
            names: UniqueNames::new(),
            entries: Vec::new(),
        }
    }

    /// Adds `bytes` as `<stem>.pdf` and returns the entry name used.
    pub fn add(&mut self, stem: &str, bytes: &[u8]) -> Result<String, ArchiveError> {
        let entry_name = format!("{}.pdf", self.names.claim(stem));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.writer
            .start_file(entry_name.as_str(), options)
            .map_err(|e| ArchiveError::WriteEntry {
                name: entry_name.clone(),
                source: e.into(),
            })?;
        self.writer
            .write_all(bytes)
            .map_err(|e| ArchiveError::WriteEntry {
                name: entry_name.clone(),
                source: e,
            })?;

        self.entries.push(entry_name.clone());
        Ok(entry_name)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the central directory and returns the underlying writer.
    pub fn finish(self) -> Result<W, ArchiveError> {
        self.writer.finish().map_err(|e| ArchiveError::WriteEntry {
            name: "<central directory>".to_string(),
            source: e.into(),
        })
    }
}

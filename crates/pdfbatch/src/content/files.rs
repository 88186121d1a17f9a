use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::content::{admit_name, is_pdf_name, ContentStore};
use crate::error::{ArchiveError, ProcessError};
use crate::parser::UniqueNames;
use crate::sanitize::redact_path;

/// Documents read lazily from disk, addressed by their file name.
///
/// Two inputs with the same file name in different directories are told
/// apart with a numeric stem suffix.
#[derive(Debug, Default)]
pub struct FileContentStore {
    order: Vec<String>,
    paths: HashMap<String, PathBuf>,
    used: UniqueNames,
}

impl FileContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every PDF under `inputs`, which may mix files and directories.
    /// Directories are walked recursively in file-name order.
    pub fn collect<P: AsRef<Path>>(inputs: &[P]) -> Result<Self, ArchiveError> {
        let mut store = Self::new();
        for input in inputs {
            for path in scan_pdfs(input.as_ref())? {
                store.add(path);
            }
        }
        log::info!("Collected {} PDF documents", store.order.len());
        Ok(store)
    }

    /// Registers `path` and returns the name it is addressed by.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> String {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let name = admit_name(&mut self.used, &file_name);
        self.order.push(name.clone());
        self.paths.insert(name.clone(), path);
        name
    }

    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }
}

fn scan_pdfs(input: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut found = Vec::new();

    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::ScanFailed {
            path: input.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_pdf_name(&name) {
            found.push(entry.into_path());
        } else if entry.depth() == 0 {
            log::warn!("Ignoring non-PDF input {}", redact_path(input));
        } else {
            log::debug!("Skipping non-PDF file {}", redact_path(entry.path()));
        }
    }

    Ok(found)
}

impl ContentStore for FileContentStore {
    fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>, ProcessError> {
        let path = self
            .paths
            .get(name)
            .ok_or_else(|| ProcessError::MissingContent(name.to_string()))?;
        std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.clone(),
            source: e,
        })
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_walks_directories_in_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.pdf", b"b");
        touch(temp.path(), "a.PDF", b"a");
        touch(temp.path(), "notes.txt", b"x");
        touch(temp.path(), "sub/c.pdf", b"c");

        let store = FileContentStore::collect(&[temp.path()]).unwrap();

        assert_eq!(store.names(), vec!["a.PDF", "b.pdf", "c.pdf"]);
        assert_eq!(store.load("c.pdf").unwrap(), b"c");
    }

    #[test]
    fn test_collect_mixed_inputs_dedupes_names() {
        let temp = TempDir::new().unwrap();
        let first = touch(temp.path(), "one/nf.pdf", b"1");
        touch(temp.path(), "two/nf.pdf", b"2");

        let store = FileContentStore::collect(&[first, temp.path().join("two")]).unwrap();

        assert_eq!(store.names(), vec!["nf.pdf", "nf_1.pdf"]);
        assert_eq!(store.load("nf_1.pdf").unwrap(), b"2");
    }

    #[test]
    fn test_collect_missing_input_fails() {
        let temp = TempDir::new().unwrap();
        let result = FileContentStore::collect(&[temp.path().join("nope")]);
        assert!(matches!(result, Err(ArchiveError::ScanFailed { .. })));
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().unwrap();
        let mut store = FileContentStore::new();
        let name = store.add(temp.path().join("gone.pdf"));

        assert!(matches!(
            store.load(&name),
            Err(ProcessError::ReadDocument { .. })
        ));
        assert!(matches!(
            store.load("other.pdf"),
            Err(ProcessError::MissingContent(_))
        ));
        assert_eq!(store.path_of(&name), Some(temp.path().join("gone.pdf").as_path()));
    }
}

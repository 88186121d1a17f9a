//! Whole-document JSON persistence for batch records.
//!
//! The full map is held in memory and rewritten on every save. There is no
//! journaling and no protection against a second process writing the same
//! file; the last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::batch::model::{Batch, BatchId};
use crate::error::StorageError;

pub struct BatchStore {
    path: PathBuf,
    batches: BTreeMap<BatchId, Batch>,
}

impl BatchStore {
    /// Opens the store at `path`, creating its directory if needed.
    ///
    /// A missing or unreadable document yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        ensure_parent_directory(&path)?;
        let batches = load(&path);
        Ok(Self { path, batches })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full map to a sibling temp file, then renames it over the
    /// document so readers never observe a half-written file.
    pub fn save(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.batches)?;
        let tmp_path = temp_path(&self.path);

        std::fs::write(&tmp_path, json).map_err(|e| StorageError::WriteFile {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            StorageError::WriteFile {
                path: self.path.clone(),
                source: e,
            }
        })?;

        log::trace!("Saved {} batches to {}", self.batches.len(), self.path.display());
        Ok(())
    }

    pub fn batches(&self) -> &BTreeMap<BatchId, Batch> {
        &self.batches
    }

    pub fn get(&self, id: &str) -> Option<&Batch> {
        self.batches.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Batch> {
        self.batches.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.batches.contains_key(id)
    }

    pub(crate) fn insert(&mut self, batch: Batch) {
        self.batches.insert(batch.id.clone(), batch);
    }

    pub(crate) fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&BatchId, &mut Batch) -> bool,
    {
        let before = self.batches.len();
        self.batches.retain(keep);
        before - self.batches.len()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Batch> {
        self.batches.values_mut()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

fn ensure_parent_directory(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "batches.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn load(path: &Path) -> BTreeMap<BatchId, Batch> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No batch store at {}, starting empty", path.display());
            return BTreeMap::new();
        }
        Err(e) => {
            log::warn!(
                "Failed to read batch store {}: {}. Starting empty.",
                path.display(),
                e
            );
            return BTreeMap::new();
        }
    };

    let mut batches: BTreeMap<BatchId, Batch> = match serde_json::from_str(&content) {
        Ok(batches) => batches,
        Err(e) => {
            log::warn!(
                "Batch store {} is corrupt: {}. Starting empty.",
                path.display(),
                e
            );
            return BTreeMap::new();
        }
    };

    for (id, batch) in batches.iter_mut() {
        if batch.id != *id {
            log::warn!("Batch stored under '{}' has id '{}', using key", id, batch.id);
            batch.id = id.clone();
        }
        if batch.repair_counters() {
            log::warn!("Repaired inconsistent counters of batch {}", id);
        }
    }

    log::debug!("Loaded {} batches from {}", batches.len(), path.display());
    batches
}

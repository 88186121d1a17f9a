//! Partitioning and lifecycle of batches.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::batch::model::{Batch, BatchId, BatchStatus, FileDescriptor};
use crate::batch::store::BatchStore;
use crate::config::schema::Config;
use crate::error::{ConfigError, PdfBatchError, StorageError};

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_RETENTION_DAYS: i64 = 7;
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 60;
/// One year.
pub const MAX_STALE_AFTER_MINUTES: i64 = 525_600;

/// Number of batches in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.failed
    }
}

/// Sole owner of batch records.
///
/// Every mutation is written through to the [`BatchStore`] before returning.
/// Mutators called with an id that does not exist are no-ops.
pub struct BatchManager {
    store: BatchStore,
    batch_size: usize,
    retention_days: i64,
    stale_after: Duration,
}

impl BatchManager {
    pub fn new(store: BatchStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            retention_days: DEFAULT_RETENTION_DAYS,
            stale_after: Duration::minutes(DEFAULT_STALE_AFTER_MINUTES),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PdfBatchError> {
        let stale_after = Duration::try_minutes(config.stale_after_minutes)
            .filter(|_| (1..=MAX_STALE_AFTER_MINUTES).contains(&config.stale_after_minutes))
            .ok_or_else(|| ConfigError::Validation {
                message: format!(
                    "stale_after_minutes must be between 1 and {}, got {}",
                    MAX_STALE_AFTER_MINUTES, config.stale_after_minutes
                ),
            })?;

        let store = BatchStore::open(&config.storage_path)?;
        Ok(Self::new(store, config.batch_size)
            .with_retention_days(config.retention_days)
            .with_stale_after(stale_after))
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    // ─── Partitioning ───────────────────────────────────────────────────────

    /// Splits `files` into consecutive chunks of at most `batch_size`, one
    /// `pending` batch per chunk, and returns the new ids in chunk order.
    ///
    /// Each descriptor keeps its position in `files` as `index`. The store is
    /// written once, after every batch has been inserted.
    pub fn create_batches<S: AsRef<str>>(
        &mut self,
        files: &[S],
        doc_type: &str,
        pattern: &str,
    ) -> Result<Vec<BatchId>, StorageError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut ids = Vec::with_capacity(files.len().div_ceil(self.batch_size));

        for (chunk_num, chunk) in files.chunks(self.batch_size).enumerate() {
            let offset = chunk_num * self.batch_size;
            let descriptors = chunk
                .iter()
                .enumerate()
                .map(|(i, name)| FileDescriptor {
                    name: name.as_ref().to_string(),
                    index: offset + i,
                })
                .collect();

            let id = self.generate_id();
            self.store
                .insert(Batch::new(id.clone(), doc_type, pattern, descriptors, now));
            ids.push(id);
        }

        self.store.save()?;
        log::info!(
            "Created {} batches for {} files (doc_type={}, batch_size={})",
            ids.len(),
            files.len(),
            doc_type,
            self.batch_size
        );
        Ok(ids)
    }

    /// Eight hex characters of a v4 UUID, regenerated on collision.
    fn generate_id(&self) -> BatchId {
        loop {
            let id: BatchId = uuid::Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(8)
                .collect();
            if !self.store.contains(&id) {
                return id;
            }
            log::debug!("Batch id {} already taken, regenerating", id);
        }
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn get_batch(&self, id: &str) -> Option<&Batch> {
        self.store.get(id)
    }

    pub fn get_all_batches(&self) -> &BTreeMap<BatchId, Batch> {
        self.store.batches()
    }

    /// `(processed + failed) / total`; `0.0` for unknown or empty batches.
    pub fn get_progress(&self, id: &str) -> f64 {
        self.store.get(id).map(Batch::progress).unwrap_or(0.0)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for batch in self.store.batches().values() {
            match batch.status {
                BatchStatus::Pending => counts.pending += 1,
                BatchStatus::Processing => counts.processing += 1,
                BatchStatus::Completed => counts.completed += 1,
                BatchStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// All batches, oldest first. Batches from the same `create_batches`
    /// call share `created_at` and stay in input order.
    pub fn batches_by_age(&self) -> Vec<&Batch> {
        let mut batches: Vec<&Batch> = self.store.batches().values().collect();
        batches.sort_by_key(|b| (b.created_at, b.files.first().map(|f| f.index)));
        batches
    }

    /// Ids of `pending` batches, oldest first.
    pub fn pending_batches(&self) -> Vec<BatchId> {
        self.batches_by_age()
            .into_iter()
            .filter(|b| b.status == BatchStatus::Pending)
            .map(|b| b.id.clone())
            .collect()
    }

    // ─── Mutations ──────────────────────────────────────────────────────────

    pub fn update_batch_status(
        &mut self,
        id: &str,
        status: BatchStatus,
    ) -> Result<(), StorageError> {
        self.mutate(id, "update_batch_status", |batch, now| {
            log::debug!("Batch {}: {} -> {}", batch.id, batch.status, status);
            batch.set_status(status, now);
        })
    }

    pub fn add_batch_result(
        &mut self,
        id: &str,
        original_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError> {
        self.mutate(id, "add_batch_result", |batch, now| {
            batch.push_result(original_name, new_name, now);
        })
    }

    pub fn add_batch_error(
        &mut self,
        id: &str,
        file_name: &str,
        error_message: &str,
    ) -> Result<(), StorageError> {
        self.mutate(id, "add_batch_error", |batch, now| {
            batch.push_error(file_name, error_message, now);
        })
    }

    fn mutate<F>(&mut self, id: &str, operation: &str, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Batch, DateTime<Utc>),
    {
        let Some(batch) = self.store.get_mut(id) else {
            log::debug!("{}: unknown batch '{}', ignoring", operation, id);
            return Ok(());
        };
        apply(batch, Utc::now());
        self.store.save()
    }

    // ─── Maintenance ────────────────────────────────────────────────────────

    /// Removes `completed` batches last updated more than `retention_days`
    /// whole days ago. Other states are never removed.
    pub fn clear_completed_batches(&mut self) -> Result<usize, StorageError> {
        self.clear_completed_batches_at(Utc::now())
    }

    pub fn clear_completed_batches_at(&mut self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let retention_days = self.retention_days;
        let removed = self.store.retain(|_, batch| {
            !(batch.status == BatchStatus::Completed
                && (now - batch.updated_at).num_days() > retention_days)
        });

        if removed > 0 {
            self.store.save()?;
            log::info!(
                "Removed {} completed batches older than {} days",
                removed,
                retention_days
            );
        }
        Ok(removed)
    }

    /// Demotes `processing` batches idle for longer than the stale threshold
    /// back to `pending`, so an interrupted run can be resumed.
    pub fn recover_stale_batches(&mut self) -> Result<Vec<BatchId>, StorageError> {
        self.recover_stale_batches_at(Utc::now())
    }

    pub fn recover_stale_batches_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Vec<BatchId>, StorageError> {
        let stale_after = self.stale_after;
        let mut recovered = Vec::new();

        for batch in self.store.values_mut() {
            if batch.status == BatchStatus::Processing && now - batch.updated_at > stale_after {
                batch.set_status(BatchStatus::Pending, now);
                recovered.push(batch.id.clone());
            }
        }

        if !recovered.is_empty() {
            self.store.save()?;
            log::warn!(
                "Recovered {} stale batches: {}",
                recovered.len(),
                recovered.join(", ")
            );
        }
        Ok(recovered)
    }
}

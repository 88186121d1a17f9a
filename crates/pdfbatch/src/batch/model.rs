//! Batch records as persisted in the batch store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BatchId = String;

/// Lifecycle state of a batch.
///
/// `Failed` is accepted when reading a store but is never assigned by the
/// engine: a batch whose files all failed still ends `Completed`, with the
/// failures visible in its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A file queued in a batch. Content is looked up by `name` elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    /// Position in the input list the batch was partitioned from.
    pub index: usize,
}

/// A successfully renamed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub original_name: String,
    pub new_name: String,
    pub timestamp: DateTime<Utc>,
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub file_name: String,
    pub error_message: String,
}

/// A bounded unit of work.
///
/// Fields are only mutable through [`crate::batch::BatchManager`], which
/// keeps `total_files == files.len()` and `processed_files == results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub(crate) id: BatchId,
    pub(crate) status: BatchStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) total_files: usize,
    pub(crate) processed_files: usize,
    pub(crate) failed_files: usize,
    pub(crate) doc_type: String,
    pub(crate) pattern: String,
    pub(crate) files: Vec<FileDescriptor>,
    #[serde(default)]
    pub(crate) results: Vec<RenameRecord>,
    #[serde(default)]
    pub(crate) errors: Vec<FailureRecord>,
}

impl Batch {
    pub(crate) fn new(
        id: BatchId,
        doc_type: &str,
        pattern: &str,
        files: Vec<FileDescriptor>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status: BatchStatus::Pending,
            created_at: now,
            updated_at: now,
            total_files: files.len(),
            processed_files: 0,
            failed_files: 0,
            doc_type: doc_type.to_string(),
            pattern: pattern.to_string(),
            files,
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn failed_files(&self) -> usize {
        self.failed_files
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn results(&self) -> &[RenameRecord] {
        &self.results
    }

    pub fn errors(&self) -> &[FailureRecord] {
        &self.errors
    }

    /// Fraction of files with a recorded outcome, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        let done = (self.processed_files + self.failed_files) as f64;
        (done / self.total_files as f64).min(1.0)
    }

    /// Whether `name` already has a result or an error in this batch.
    pub fn is_recorded(&self, name: &str) -> bool {
        self.results.iter().any(|r| r.original_name == name)
            || self.errors.iter().any(|e| e.file_name == name)
    }

    /// Files without a recorded outcome, in batch order.
    pub fn outstanding_files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| !self.is_recorded(&f.name))
    }

    pub(crate) fn set_status(&mut self, status: BatchStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub(crate) fn push_result(&mut self, original_name: &str, new_name: &str, now: DateTime<Utc>) {
        self.results.push(RenameRecord {
            original_name: original_name.to_string(),
            new_name: new_name.to_string(),
            timestamp: now,
        });
        self.processed_files = self.results.len();
        self.updated_at = now;
    }

    pub(crate) fn push_error(&mut self, file_name: &str, error_message: &str, now: DateTime<Utc>) {
        self.errors.push(FailureRecord {
            file_name: file_name.to_string(),
            error_message: error_message.to_string(),
        });
        self.failed_files += 1;
        self.updated_at = now;
    }

    /// Restores derived counters after reading a hand-edited or older store.
    pub(crate) fn repair_counters(&mut self) -> bool {
        let mut repaired = false;
        if self.processed_files != self.results.len() {
            self.processed_files = self.results.len();
            repaired = true;
        }
        if self.total_files != self.files.len() {
            self.total_files = self.files.len();
            repaired = true;
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<FileDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| FileDescriptor {
                name: name.to_string(),
                index,
            })
            .collect()
    }

    #[test]
    fn test_new_batch_is_pending() {
        let now = Utc::now();
        let batch = Batch::new("abc".into(), "nota-fiscal", "NF + Número", files(&["a.pdf"]), now);

        assert_eq!(batch.status(), BatchStatus::Pending);
        assert_eq!(batch.total_files(), 1);
        assert_eq!(batch.created_at(), batch.updated_at());
        assert_eq!(batch.progress(), 0.0);
    }

    #[test]
    fn test_result_recomputes_processed() {
        let now = Utc::now();
        let mut batch = Batch::new("abc".into(), "t", "p", files(&["a.pdf", "b.pdf"]), now);

        batch.push_result("a.pdf", "NF_1", now);
        assert_eq!(batch.processed_files(), 1);
        assert_eq!(batch.progress(), 0.5);

        batch.push_error("b.pdf", "unreadable", now);
        assert_eq!(batch.failed_files(), 1);
        assert_eq!(batch.progress(), 1.0);
    }

    #[test]
    fn test_progress_clamped_on_double_report() {
        let now = Utc::now();
        let mut batch = Batch::new("abc".into(), "t", "p", files(&["a.pdf"]), now);
        batch.push_result("a.pdf", "x", now);
        batch.push_error("a.pdf", "again", now);
        assert_eq!(batch.progress(), 1.0);
    }

    #[test]
    fn test_empty_batch_progress() {
        let batch = Batch::new("abc".into(), "t", "p", Vec::new(), Utc::now());
        assert_eq!(batch.progress(), 0.0);
    }

    #[test]
    fn test_outstanding_files() {
        let now = Utc::now();
        let mut batch = Batch::new("abc".into(), "t", "p", files(&["a.pdf", "b.pdf", "c.pdf"]), now);
        batch.push_result("a.pdf", "x", now);
        batch.push_error("c.pdf", "bad", now);

        let outstanding: Vec<_> = batch.outstanding_files().map(|f| f.name.as_str()).collect();
        assert_eq!(outstanding, vec!["b.pdf"]);
        assert!(batch.is_recorded("a.pdf"));
        assert!(!batch.is_recorded("b.pdf"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&BatchStatus::Processing).unwrap(),
            "\"processing\""
        );
        let parsed: BatchStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, BatchStatus::Failed);
        assert_eq!(BatchStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_repair_counters() {
        let now = Utc::now();
        let mut batch = Batch::new("abc".into(), "t", "p", files(&["a.pdf"]), now);
        batch.push_result("a.pdf", "x", now);
        batch.processed_files = 5;
        batch.total_files = 9;

        assert!(batch.repair_counters());
        assert_eq!(batch.processed_files(), 1);
        assert_eq!(batch.total_files(), 1);
        assert!(!batch.repair_counters());
    }
}

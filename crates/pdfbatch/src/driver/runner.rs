use tracing::{debug, info_span, warn};

use crate::batch::{BatchId, BatchManager, BatchStatus, FailureRecord};
use crate::config::schema::{Config, NamingOptions};
use crate::content::ContentStore;
use crate::error::{PdfBatchError, Result};
use crate::extractor::{
    extraction_error_message, is_extraction_error, ExtractOptions, PdfExtractor, TextExtractor,
};
use crate::parser::{fallback_name, FieldParser, UniqueNames};
use crate::sanitize;

use super::progress::{ProgressEvent, ProgressReporter};

/// A document that received a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedDocument {
    pub batch_id: BatchId,
    pub original_name: String,
    /// New stem, without extension.
    pub new_name: String,
    /// True when no field matched and the placeholder name was used.
    pub fallback: bool,
}

/// Everything a run did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub batch_ids: Vec<BatchId>,
    pub renamed: Vec<RenamedDocument>,
    pub failed: Vec<FailureRecord>,
}

impl RunReport {
    /// `(original_name, new_name)` pairs for the result archive.
    pub fn renamed_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renamed
            .iter()
            .map(|r| (r.original_name.as_str(), r.new_name.as_str()))
    }

    pub fn fallback_count(&self) -> usize {
        self.renamed.iter().filter(|r| r.fallback).count()
    }

    fn absorb(&mut self, other: RunReport) {
        self.batch_ids.extend(other.batch_ids);
        self.renamed.extend(other.renamed);
        self.failed.extend(other.failed);
    }
}

/// Sequential orchestration: one batch at a time, one file at a time.
///
/// The driver owns the stateless collaborators (extractor and parser) and
/// borrows the [`BatchManager`] and [`ContentStore`] per call, so batch state
/// and document bytes stay with their owners.
pub struct BatchDriver {
    extractor: Box<dyn TextExtractor>,
    parser: FieldParser,
    naming: NamingOptions,
    extract_options: ExtractOptions,
}

impl BatchDriver {
    /// Production constructor: PDF extraction with OCR per config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(PdfExtractor::from_config(&config.ocr)),
            FieldParser::from_config(config),
            config.naming.clone(),
            ExtractOptions::from(&config.ocr),
        )
    }

    pub fn new(
        extractor: Box<dyn TextExtractor>,
        parser: FieldParser,
        naming: NamingOptions,
        extract_options: ExtractOptions,
    ) -> Self {
        Self {
            extractor,
            parser,
            naming,
            extract_options,
        }
    }

    pub fn with_naming(mut self, naming: NamingOptions) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming(&self) -> &NamingOptions {
        &self.naming
    }

    pub fn parser(&self) -> &FieldParser {
        &self.parser
    }

    /// Partitions every document in `content` into new batches and processes
    /// them in order. New names are unique across the whole run.
    pub fn run(
        &self,
        manager: &mut BatchManager,
        content: &dyn ContentStore,
        doc_type: &str,
        pattern: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        if !self.parser.has_template(doc_type) {
            return Err(PdfBatchError::UnknownDocType(doc_type.to_string()));
        }

        let _span = info_span!("driver.run", doc_type, pattern).entered();

        let names = content.names();
        let batch_ids = manager.create_batches(&names, doc_type, pattern)?;
        let mut used = UniqueNames::new();
        let mut report = RunReport::default();

        for batch_id in &batch_ids {
            report.absorb(self.process_batch(manager, batch_id, content, &mut used, progress)?);
        }

        Ok(report)
    }

    /// Processes every `pending` batch, oldest first. Files that already have
    /// a result or an error are skipped, and names recorded earlier stay
    /// reserved so resumed files cannot collide with them.
    pub fn resume(
        &self,
        manager: &mut BatchManager,
        content: &dyn ContentStore,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let _span = info_span!("driver.resume").entered();

        let pending = manager.pending_batches();
        let mut used = UniqueNames::new();
        for batch_id in &pending {
            if let Some(batch) = manager.get_batch(batch_id) {
                for result in batch.results() {
                    used.reserve(&result.new_name);
                }
            }
        }

        let mut report = RunReport::default();
        for batch_id in &pending {
            report.absorb(self.process_batch(manager, batch_id, content, &mut used, progress)?);
        }
        Ok(report)
    }

    /// Runs one batch from `processing` to `completed`.
    ///
    /// Per-file failures are recorded on the batch and never stop it. Only
    /// storage errors propagate. An unknown id yields an empty report.
    pub fn process_batch(
        &self,
        manager: &mut BatchManager,
        batch_id: &str,
        content: &dyn ContentStore,
        used: &mut UniqueNames,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let Some(batch) = manager.get_batch(batch_id) else {
            debug!(batch_id, "process_batch: unknown batch");
            return Ok(RunReport::default());
        };

        let doc_type = batch.doc_type().to_string();
        let pattern = batch.pattern().to_string();
        let total_files = batch.total_files();
        let outstanding: Vec<_> = batch.outstanding_files().cloned().collect();

        let _span = info_span!("driver.batch", batch_id, total_files).entered();
        if !self.parser.has_template(&doc_type) {
            warn!(%doc_type, "Batch uses an unknown document type; every file gets a placeholder name");
        }

        manager.update_batch_status(batch_id, BatchStatus::Processing)?;
        progress.report(ProgressEvent::BatchStarted {
            batch_id: batch_id.to_string(),
            total_files,
        });

        let mut report = RunReport {
            batch_ids: vec![batch_id.to_string()],
            ..RunReport::default()
        };

        for file in &outstanding {
            let _file_span = info_span!(
                "driver.file",
                index = file.index,
                file = %sanitize::redact_name(&file.name),
            )
            .entered();

            match self.rename_one(content, &file.name, &doc_type, &pattern) {
                Ok(parsed) => {
                    let fallback = parsed.is_none();
                    let stem = parsed.unwrap_or_else(|| {
                        fallback_name(&self.naming.fallback_prefix, file.index)
                    });
                    let new_name = used.claim(&stem);
                    if new_name != stem {
                        debug!(%stem, %new_name, "Resolved duplicate name");
                    }
                    manager.add_batch_result(batch_id, &file.name, &new_name)?;
                    progress.report(ProgressEvent::FileRenamed {
                        batch_id: batch_id.to_string(),
                        original_name: file.name.clone(),
                        new_name: new_name.clone(),
                        progress: manager.get_progress(batch_id),
                    });
                    report.renamed.push(RenamedDocument {
                        batch_id: batch_id.to_string(),
                        original_name: file.name.clone(),
                        new_name,
                        fallback,
                    });
                }
                Err(message) => {
                    manager.add_batch_error(batch_id, &file.name, &message)?;
                    progress.report(ProgressEvent::FileFailed {
                        batch_id: batch_id.to_string(),
                        file_name: file.name.clone(),
                        error: message.clone(),
                        progress: manager.get_progress(batch_id),
                    });
                    report.failed.push(FailureRecord {
                        file_name: file.name.clone(),
                        error_message: message,
                    });
                }
            }
        }

        manager.update_batch_status(batch_id, BatchStatus::Completed)?;
        let (processed, failed) = manager
            .get_batch(batch_id)
            .map(|b| (b.processed_files(), b.failed_files()))
            .unwrap_or_default();
        progress.report(ProgressEvent::BatchCompleted {
            batch_id: batch_id.to_string(),
            processed,
            failed,
        });

        Ok(report)
    }

    /// Extracts and parses one document. `Ok(None)` when no field matched,
    /// `Err(message)` when the document must be recorded as failed.
    fn rename_one(
        &self,
        content: &dyn ContentStore,
        name: &str,
        doc_type: &str,
        pattern: &str,
    ) -> std::result::Result<Option<String>, String> {
        let bytes = content.load(name).map_err(|e| e.to_string())?;

        let text = {
            let _step = info_span!("extract_text", bytes = bytes.len()).entered();
            self.extractor.extract(&bytes, &self.extract_options)
        };
        if is_extraction_error(&text) {
            return Err(extraction_error_message(&text).to_string());
        }

        let _step = info_span!("generate_filename").entered();
        let stem = self
            .parser
            .generate_filename(&text, doc_type, pattern, &self.naming);
        if stem.is_none() {
            debug!("No field matched, using placeholder name");
        }
        Ok(stem)
    }
}

/// Events emitted by the driver while it works through batches.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    BatchStarted {
        batch_id: String,
        total_files: usize,
    },
    FileRenamed {
        batch_id: String,
        original_name: String,
        new_name: String,
        progress: f64,
    },
    FileFailed {
        batch_id: String,
        file_name: String,
        error: String,
        progress: f64,
    },
    BatchCompleted {
        batch_id: String,
        processed: usize,
        failed: usize,
    },
}

pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests and library callers that poll instead.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Emits every event as a tracing event.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted {
                batch_id,
                total_files,
            } => tracing::info!(%batch_id, total_files, "Batch started"),
            ProgressEvent::FileRenamed {
                batch_id,
                new_name,
                progress,
                ..
            } => tracing::info!(
                %batch_id,
                %new_name,
                progress = %format!("{:.0}%", progress * 100.0),
                "Renamed"
            ),
            ProgressEvent::FileFailed {
                batch_id,
                error,
                progress,
                ..
            } => tracing::warn!(
                %batch_id,
                %error,
                progress = %format!("{:.0}%", progress * 100.0),
                "File failed"
            ),
            ProgressEvent::BatchCompleted {
                batch_id,
                processed,
                failed,
            } => tracing::info!(%batch_id, processed, failed, "Batch completed"),
        }
    }
}

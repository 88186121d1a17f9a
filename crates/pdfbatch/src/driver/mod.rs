//! Sequential orchestration of extraction, naming and batch bookkeeping.

pub mod progress;
pub mod runner;

pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::{BatchDriver, RenamedDocument, RunReport};

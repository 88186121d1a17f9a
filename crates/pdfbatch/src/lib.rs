pub mod archive;
pub mod batch;
pub mod config;
pub mod content;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod sanitize;

pub use archive::{export_batch, ingest_zip_file, write_results, ExportSummary, ResultArchive};
pub use batch::{Batch, BatchId, BatchManager, BatchStatus, BatchStore, StatusCounts};
pub use config::{load_config, load_config_or_default, Config, NamingOptions};
pub use content::{ContentStore, FileContentStore, MemoryContentStore};
pub use driver::{BatchDriver, LogProgress, NoopProgress, ProgressReporter, RunReport};
pub use error::{
    ArchiveError, ConfigError, PdfBatchError, ProcessError, Result, StorageError,
};
pub use extractor::{is_extraction_error, ExtractOptions, PdfExtractor, TextExtractor};
pub use parser::FieldParser;

//! Text extraction from raw document bytes.
//!
//! Extractors never fail loudly: on total failure they return a sentinel
//! string that starts with [`EXTRACTION_ERROR_MARKER`]. Callers check it with
//! [`is_extraction_error`] and record the file as failed.

#[cfg(feature = "ocr")]
pub mod ocr;
#[cfg(not(feature = "ocr"))]
#[path = "ocr_stub.rs"]
pub mod ocr;
pub mod pdf;

use crate::config::schema::OcrConfig;
use crate::error::ProcessError;

pub use ocr::OcrEngine;
pub use pdf::PdfExtractor;

/// Prefix of the sentinel returned when no text could be produced.
pub const EXTRACTION_ERROR_MARKER: &str = "ERROR";

/// Direct text at or below this many characters triggers the OCR fallback.
pub const MIN_DIRECT_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Pages read from the start of the document.
    pub max_pages: usize,
    /// Render resolution for OCR.
    pub dpi: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_pages: 2,
            dpi: 150,
        }
    }
}

impl From<&OcrConfig> for ExtractOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            dpi: config.dpi,
        }
    }
}

pub trait TextExtractor: Send + Sync {
    /// Best-effort text for `bytes`, or an error sentinel.
    fn extract(&self, bytes: &[u8], options: &ExtractOptions) -> String;
}

/// True for `"ERROR: ..."`. Text that merely begins with the word does not count.
pub fn is_extraction_error(text: &str) -> bool {
    text.strip_prefix(EXTRACTION_ERROR_MARKER)
        .is_some_and(|rest| rest.starts_with(':'))
}

pub fn extraction_error(err: &ProcessError) -> String {
    format!("{}: {}", EXTRACTION_ERROR_MARKER, err)
}

/// Strips the sentinel prefix, leaving the human-readable reason.
pub fn extraction_error_message(text: &str) -> &str {
    text.strip_prefix(EXTRACTION_ERROR_MARKER)
        .map(|rest| rest.trim_start_matches(':').trim())
        .unwrap_or(text)
}

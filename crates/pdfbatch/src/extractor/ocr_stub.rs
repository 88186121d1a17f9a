//! Stand-in used when the crate is built without the "ocr" feature.
//!
//! Same API as the tesseract engine; every recognition attempt fails.

use crate::error::ProcessError;

#[derive(Clone)]
pub struct OcrEngine {
    languages: String,
}

impl OcrEngine {
    pub fn new(languages: &[String]) -> Self {
        let languages = if languages.is_empty() {
            "por".to_string()
        } else {
            languages.join("+")
        };
        Self { languages }
    }

    pub fn available() -> bool {
        false
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    pub fn process_image_bytes(&self, _image_data: &[u8]) -> Result<String, ProcessError> {
        Err(ProcessError::OcrFailed(
            "OCR support not compiled in (enable the \"ocr\" feature)".to_string(),
        ))
    }
}

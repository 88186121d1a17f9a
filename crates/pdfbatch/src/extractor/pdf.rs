use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::schema::OcrConfig;
use crate::error::ProcessError;
use crate::extractor::ocr::OcrEngine;
use crate::extractor::{extraction_error, ExtractOptions, TextExtractor, MIN_DIRECT_TEXT_CHARS};

/// Direct text via lopdf, falling back to page rendering and OCR when the
/// embedded text is too short to be useful.
pub struct PdfExtractor {
    ocr: Option<OcrEngine>,
}

impl PdfExtractor {
    pub fn new(ocr: Option<OcrEngine>) -> Self {
        Self { ocr }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        if !config.enabled {
            return Self::new(None);
        }
        if !OcrEngine::available() {
            log::warn!("OCR is enabled in config but this build has no OCR support");
            return Self::new(None);
        }
        Self::new(Some(OcrEngine::new(&config.languages)))
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn try_extract(
        &self,
        pdf_bytes: &[u8],
        options: &ExtractOptions,
    ) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("extractor.pdf", bytes = pdf_bytes.len()).entered();

        let (direct, page_count) = match lopdf::Document::load_mem(pdf_bytes) {
            Ok(doc) => {
                let text = direct_text(&doc, options.max_pages);
                (text, Some(doc.get_pages().len()))
            }
            Err(e) => {
                tracing::warn!("lopdf failed to parse document: {}", e);
                let Some(ref ocr) = self.ocr else {
                    return Err(ProcessError::PdfProcessing(format!(
                        "Failed to load PDF: {}. OCR fallback unavailable.",
                        e
                    )));
                };
                let _ocr_span =
                    tracing::info_span!("extractor.ocr_fallback", reason = "lopdf_parse_failed")
                        .entered();
                let pages = count_pdf_pages(pdf_bytes)?;
                let text = ocr_pages(pdf_bytes, pages.min(options.max_pages), options.dpi, ocr);
                return non_empty(text).ok_or(ProcessError::NoText);
            }
        };

        if !needs_ocr(&direct) {
            return Ok(direct);
        }

        if let (Some(ocr), Some(pages)) = (&self.ocr, page_count) {
            let _ocr_span =
                tracing::info_span!("extractor.ocr_fallback", reason = "short_text").entered();
            let recognized = ocr_pages(pdf_bytes, pages.min(options.max_pages), options.dpi, ocr);
            if !recognized.trim().is_empty() {
                return Ok(format!("{}{}", direct, recognized));
            }
        }

        non_empty(direct).ok_or(ProcessError::NoText)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], options: &ExtractOptions) -> String {
        match self.try_extract(bytes, options) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Extraction failed: {}", e);
                extraction_error(&e)
            }
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn direct_text(doc: &lopdf::Document, max_pages: usize) -> String {
    let mut text = String::new();

    for page_num in doc.get_pages().keys().take(max_pages) {
        if let Ok(page_text) = doc.extract_text(&[*page_num]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    text
}

fn needs_ocr(text: &str) -> bool {
    text.trim().chars().count() <= MIN_DIRECT_TEXT_CHARS
}

fn ocr_pages(pdf_bytes: &[u8], page_count: usize, dpi: u32, ocr: &OcrEngine) -> String {
    let mut all_text = String::new();

    for page_num in 1..=page_count {
        let image_data = match render_pdf_page_to_image(pdf_bytes, page_num as u32, dpi) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Skipping page {}: {}", page_num, e);
                continue;
            }
        };
        match ocr.process_image_bytes(&image_data) {
            Ok(page_text) => {
                all_text.push_str(&page_text);
                all_text.push('\n');
            }
            Err(e) => tracing::warn!("OCR of page {} failed: {}", page_num, e),
        }
    }

    all_text
}

/// Scratch copy of the document for the poppler tools; removed on drop.
struct TempPdf {
    path: PathBuf,
}

impl TempPdf {
    fn write(pdf_bytes: &[u8], label: &str) -> Result<Self, ProcessError> {
        let path = std::env::temp_dir().join(format!(
            "pdfbatch_{}_{}.pdf",
            label,
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, pdf_bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to write temp PDF: {}", e)))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPdf {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Page count via pdfinfo, for documents lopdf cannot parse.
fn count_pdf_pages(pdf_bytes: &[u8]) -> Result<usize, ProcessError> {
    let pdf = TempPdf::write(pdf_bytes, "pagecount")?;

    let output = Command::new("pdfinfo")
        .arg(pdf.path())
        .output()
        .map_err(|e| {
            ProcessError::PdfProcessing(format!(
                "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(parse_page_count(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_page_count(pdfinfo_output: &str) -> usize {
    pdfinfo_output
        .lines()
        .filter_map(|line| line.strip_prefix("Pages:"))
        .find_map(|count| count.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

fn render_pdf_page_to_image(
    pdf_bytes: &[u8],
    page_num: u32,
    dpi: u32,
) -> Result<Vec<u8>, ProcessError> {
    let pdf = TempPdf::write(pdf_bytes, "render")?;
    let output_prefix = std::env::temp_dir().join(format!("pdfbatch_page_{}", uuid::Uuid::new_v4()));
    let page = page_num.to_string();

    let output = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-f")
        .arg(&page)
        .arg("-l")
        .arg(&page)
        .arg(pdf.path())
        .arg(&output_prefix)
        .output()
        .map_err(|e| {
            ProcessError::PdfProcessing(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm pads the page suffix to the width of the page count
    let prefix = output_prefix.display();
    let candidates = [
        format!("{}-{}.png", prefix, page_num),
        format!("{}-{:02}.png", prefix, page_num),
        format!("{}-{:03}.png", prefix, page_num),
    ];
    let image_path = candidates
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .ok_or_else(|| {
            ProcessError::PdfProcessing("Failed to find rendered page image".to_string())
        })?;

    let image_data = std::fs::read(image_path).map_err(|e| {
        ProcessError::PdfProcessing(format!("Failed to read rendered image: {}", e))
    })?;
    let _ = std::fs::remove_file(image_path);

    Ok(image_data)
}

//! Test harness for isolated batch runs.
//!
//! Each `TestHarness` owns a temporary directory holding the input
//! documents, the batch store file and the result archives, so tests never
//! share state.

#![allow(dead_code)]

use std::io::Read;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use pdfbatch::config::schema::{Config, OcrConfig};
use pdfbatch::{BatchDriver, BatchManager};

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub store_path: PathBuf,
    batch_size: usize,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_batch_size(50)
    }

    pub fn with_batch_size(batch_size: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let input_dir = base.join("input");
        let output_dir = base.join("output");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");
        std::fs::create_dir_all(&output_dir).expect("Failed to create output dir");

        Self {
            store_path: base.join("state").join("batches.json"),
            temp_dir,
            input_dir,
            output_dir,
            batch_size,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config pointing at this harness's store, with OCR off.
    pub fn config(&self) -> Config {
        Config {
            batch_size: self.batch_size,
            storage_path: self.store_path.display().to_string(),
            ocr: OcrConfig {
                enabled: false,
                ..OcrConfig::default()
            },
            ..Config::default()
        }
    }

    /// Opens the store file afresh, as a new process would.
    pub fn manager(&self) -> BatchManager {
        BatchManager::from_config(&self.config()).expect("Failed to open batch store")
    }

    pub fn driver(&self) -> BatchDriver {
        BatchDriver::from_config(&self.config())
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create input subdirectory");
        }
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    pub fn store_json(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(&self.store_path).expect("Failed to read store");
        serde_json::from_str(&content).expect("Store is not valid JSON")
    }

    pub fn write_store_json(&self, value: &serde_json::Value) {
        let json = serde_json::to_string_pretty(value).expect("Failed to serialize store");
        std::fs::write(&self.store_path, json).expect("Failed to write store");
    }
}

/// Entry names of a zip archive, sorted.
pub fn archive_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let archive = zip::ZipArchive::new(file).expect("Not a zip archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

pub fn archive_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("Not a zip archive");
    let mut entry = archive.by_name(name).expect("Missing archive entry");
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).expect("Failed to read archive entry");
    bytes
}

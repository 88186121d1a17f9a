use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::batch::manager::{DEFAULT_BATCH_SIZE, DEFAULT_RETENTION_DAYS, DEFAULT_STALE_AFTER_MINUTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub naming: NamingOptions,
    /// Document templates. Empty means the built-in set.
    #[serde(default)]
    pub templates: Vec<DocumentTemplate>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_storage_path() -> String {
    "data/batches.json".to_string()
}

fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

fn default_stale_after_minutes() -> i64 {
    DEFAULT_STALE_AFTER_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            batch_size: default_batch_size(),
            storage_path: default_storage_path(),
            retention_days: default_retention_days(),
            stale_after_minutes: default_stale_after_minutes(),
            ocr: OcrConfig::default(),
            naming: NamingOptions::default(),
            templates: Vec::new(),
        }
    }
}

impl Config {
    /// Templates in effect: the configured ones, or the built-in set.
    pub fn effective_templates(&self) -> Vec<DocumentTemplate> {
        if self.templates.is_empty() {
            crate::config::templates::builtin_templates()
        } else {
            self.templates.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    vec!["por".to_string()]
}

fn default_dpi() -> u32 {
    150
}

fn default_max_pages() -> usize {
    2
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: default_languages(),
            dpi: default_dpi(),
            max_pages: default_max_pages(),
        }
    }
}

/// Filename assembly options shared by every template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOptions {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// Stem used for documents where no field could be extracted.
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
}

fn default_separator() -> String {
    "_".to_string()
}

fn default_fallback_prefix() -> String {
    "NO_DATA".to_string()
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            prefix: String::new(),
            suffix: String::new(),
            fallback_prefix: default_fallback_prefix(),
        }
    }
}

/// A named document type: which fields to extract and how to assemble them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub name: String,
    /// Naming pattern tags offered for this template (e.g. "NF + Number + Date").
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Field name to regex. The value is the named group matching the field
    /// name, or the first capture group.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub parts: Vec<NamePart>,
    /// Free-form layout with `{field}` placeholders, used instead of `parts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamePart {
    pub field: String,
    /// Emitted before the value, joined with the separator ("NF" -> "NF_1001").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Only emitted when the selected pattern tag contains this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_pattern_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<FieldTransform>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTransform {
    /// `12/05/2024` -> `12-05-2024`
    DateDashes,
    /// `1.234,56` -> `R$1234.56`
    Currency,
    Uppercase,
    Lowercase,
}

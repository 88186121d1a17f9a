//! Built-in document templates.
//!
//! Shipped as JSON in the same shape as the `templates` config key.

use crate::config::schema::DocumentTemplate;

const BUILTIN_TEMPLATES_JSON: &str = include_str!("../../templates/builtin.json");

/// Returns the built-in templates: invoices (`nota-fiscal`), payment receipts
/// (`comprovante`), lawsuits (`processo`) and insurance claims (`sinistro`).
pub fn builtin_templates() -> Vec<DocumentTemplate> {
    serde_json::from_str(BUILTIN_TEMPLATES_JSON).unwrap_or_else(|e| {
        log::error!("Embedded template set is invalid: {}", e);
        Vec::new()
    })
}

//! Helpers for keeping document locations out of tracing span attributes.
//!
//! Inputs often live under user home directories or carry archive folder
//! names; spans only ever see the final file name.

use std::path::Path;

/// Returns only the final component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Like [`redact_path`] for names that may use either separator, such as
/// zip entry names produced on Windows.
pub fn redact_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("<unknown>")
        .to_string()
}

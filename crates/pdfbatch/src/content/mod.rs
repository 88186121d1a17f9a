//! Ownership of document bytes.
//!
//! Batches only carry file names. The driver resolves those names through a
//! [`ContentStore`] handed to it by the caller, so the batch engine never
//! holds binary payloads.

pub mod files;
pub mod memory;

use crate::error::ProcessError;
use crate::parser::UniqueNames;

pub use files::FileContentStore;
pub use memory::MemoryContentStore;

pub trait ContentStore {
    /// Document names in input order.
    fn names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool;

    fn load(&self, name: &str) -> Result<Vec<u8>, ProcessError>;

    fn len(&self) -> usize {
        self.names().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn is_pdf_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Makes `name` unique among previously admitted documents by suffixing its
/// stem: `nf.pdf`, `nf_1.pdf`.
pub(crate) fn admit_name(used: &mut UniqueNames, name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}", used.claim(stem), ext),
        _ => used.claim(name),
    }
}

//! Filename cleanup and collision handling.

use std::collections::HashSet;

/// Characters that are invalid in filenames on at least one common platform.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strips invalid filesystem characters, collapses whitespace runs to a
/// single space and trims the result.
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_whitespace() || (!INVALID_CHARS.contains(c) && !c.is_control()))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Placeholder stem for a document whose text yielded no usable field.
/// `index` is the zero-based position in the input list.
pub fn fallback_name(prefix: &str, index: usize) -> String {
    format!("{}_{}", prefix, index + 1)
}

/// Hands out names that are unique within one processing run.
///
/// The first claim of a name returns it unchanged; later claims get an
/// incrementing suffix: `NF_1001`, `NF_1001_1`, `NF_1001_2`.
#[derive(Debug, Default)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }

        let mut counter = 1usize;
        loop {
            let candidate = format!("{}_{}", base, counter);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Marks a name as taken without claiming a variant of it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }
}

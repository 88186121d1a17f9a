use std::collections::HashMap;

use crate::content::ContentStore;
use crate::error::ProcessError;

/// Documents held in memory, such as the entries of an uploaded archive.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    order: Vec<String>,
    content: HashMap<String, Vec<u8>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `name`, replacing earlier content with that name
    /// but keeping its original position.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        if self.content.insert(name.clone(), bytes).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.content.get(name).map(Vec::as_slice)
    }
}

impl ContentStore for MemoryContentStore {
    fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn contains(&self, name: &str) -> bool {
        self.content.contains_key(name)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>, ProcessError> {
        self.content
            .get(name)
            .cloned()
            .ok_or_else(|| ProcessError::MissingContent(name.to_string()))
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

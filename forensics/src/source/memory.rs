use super::{SourceAccessor, error::SourceError, prefix_matches};
use crate::utils::time::{NormalizedTime, ZoneConvention};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

struct MemoryFile {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// Source held entirely in memory. Useful for embedding and tests
pub struct MemorySource {
    files: BTreeMap<String, MemoryFile>,
    convention: ZoneConvention,
}

impl Default for MemorySource {
    fn default() -> Self {
        MemorySource::new(ZoneConvention::Utc)
    }
}

impl MemorySource {
    /// `convention` describes how modification times passed to `insert` were recorded
    pub fn new(convention: ZoneConvention) -> MemorySource {
        MemorySource {
            files: BTreeMap::new(),
            convention,
        }
    }

    pub fn insert(&mut self, path: &str, data: &[u8], modified: DateTime<Utc>) {
        self.files.insert(
            path.to_string(),
            MemoryFile {
                data: data.to_vec(),
                modified,
            },
        );
    }
}

impl SourceAccessor for MemorySource {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        match self.files.get(path) {
            Some(file) => Ok(file.data.clone()),
            None => Err(SourceError::NotFound),
        }
    }

    fn mod_time(&self, path: &str) -> Result<NormalizedTime, SourceError> {
        match self.files.get(path) {
            Some(file) => Ok(NormalizedTime {
                instant: file.modified,
                convention: self.convention,
            }),
            None => Err(SourceError::NotFound),
        }
    }

    fn size(&self, path: &str) -> Result<u64, SourceError> {
        match self.files.get(path) {
            Some(file) => Ok(file.data.len() as u64),
            None => Err(SourceError::NotFound),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, SourceError> {
        Ok(self
            .files
            .keys()
            .filter(|path| prefix_matches(prefix, path))
            .cloned()
            .collect())
    }
}

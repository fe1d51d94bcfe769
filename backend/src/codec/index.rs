//! Sidecar catalog of the files in a data directory.
//!
//! Each entry pairs a filename with its structured [`SeriesKey`], so readers do
//! not have to reverse the lossy filename encoding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IndexResult;
use crate::models::SeriesKey;

/// Catalog file name inside the data directory.
pub const INDEX_FILE_NAME: &str = "_index.json";

/// One catalogued data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub file: String,
    pub key: SeriesKey,
}

/// In-memory view of `_index.json`.
#[derive(Debug, Clone, Default)]
pub struct DataIndex {
    path: PathBuf,
    /// Keyed by filename so re-runs overwrite instead of duplicating.
    entries: BTreeMap<String, SeriesKey>,
}

impl DataIndex {
    /// Empty catalog for `dir`; nothing is read.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(INDEX_FILE_NAME),
            entries: BTreeMap::new(),
        }
    }

    /// Load the catalog of `dir`. A missing catalog is an empty one.
    pub fn load(dir: impl AsRef<Path>) -> IndexResult<Self> {
        let mut index = Self::new(dir);
        if !index.path.exists() {
            return Ok(index);
        }

        let content = fs::read_to_string(&index.path)?;
        let entries: Vec<IndexEntry> = serde_json::from_str(&content)?;
        index.entries = entries.into_iter().map(|e| (e.file, e.key)).collect();
        Ok(index)
    }

    /// Insert or replace the entry for `file`.
    pub fn upsert(&mut self, file: impl Into<String>, key: SeriesKey) {
        self.entries.insert(file.into(), key);
    }

    pub fn get(&self, file: &str) -> Option<&SeriesKey> {
        self.entries.get(file)
    }

    /// Drop entries whose data file is gone. Returns the dropped filenames.
    pub fn retain_existing(&mut self) -> Vec<String> {
        let dir = self.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|file| !dir.join(file).is_file())
            .cloned()
            .collect();
        for file in &stale {
            self.entries.remove(file);
        }
        stale
    }

    /// Entries sorted by filename.
    pub fn entries(&self) -> Vec<IndexEntry> {
        self.entries
            .iter()
            .map(|(file, key)| IndexEntry {
                file: file.clone(),
                key: key.clone(),
            })
            .collect()
    }

    /// Keys of every catalogued file.
    pub fn keys(&self) -> Vec<SeriesKey> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the catalog back next to the data files.
    pub fn save(&self) -> IndexResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Region, VariationType};

    #[test]
    fn test_missing_index_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = DataIndex::load(dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let key = SeriesKey {
            region: Region::Martinique,
            ..SeriesKey::default()
        };

        let mut index = DataIndex::load(dir.path()).unwrap();
        index.upsert("a.csv", key.clone());
        index.upsert("b.csv", key.with_variation(VariationType::MonthOverMonth));
        // Re-running overwrites the same file's entry.
        index.upsert("a.csv", key.clone());
        index.save().unwrap();

        let reloaded = DataIndex::load(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("a.csv"), Some(&key));
        assert_eq!(
            reloaded.get("b.csv").map(|k| k.variation_type),
            Some(VariationType::MonthOverMonth)
        );
    }

    #[test]
    fn test_retain_existing_drops_deleted_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kept.csv"), "").unwrap();

        let mut index = DataIndex::new(dir.path());
        index.upsert("kept.csv", SeriesKey::default());
        index.upsert(
            "deleted.csv",
            SeriesKey {
                region: Region::Guyane,
                ..SeriesKey::default()
            },
        );

        assert_eq!(index.retain_existing(), vec!["deleted.csv"]);
        assert_eq!(index.len(), 1);
        assert!(index.get("kept.csv").is_some());
        assert!(index.retain_existing().is_empty());
    }

    #[test]
    fn test_malformed_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE_NAME), "{ not json").unwrap();
        assert!(DataIndex::load(dir.path()).is_err());
    }
}

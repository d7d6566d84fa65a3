//! Append-only record of listing ids that have been notified.
//!
//! One id per line. A missing file means nothing has been seen yet.
//! Entries are never removed, so the file grows for as long as the scout runs.

use crate::error::StoreError;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// In-memory view of the persisted ids for one scan cycle
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Line-oriented file holding every id that was successfully notified
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: std::io::Error) -> StoreError {
        StoreError {
            path: self.path.clone(),
            source,
        }
    }

    /// Read every persisted id, creating empty storage on first run.
    pub fn load(&self) -> Result<SeenSet, StoreError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No seen listings file found. Creating new file.");
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| self.error(e))?;
            }
            File::create(&self.path).map_err(|e| self.error(e))?;
            return Ok(SeenSet::default());
        }

        let file = File::open(&self.path).map_err(|e| self.error(e))?;
        let mut seen = SeenSet::default();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| self.error(e))?;
            let id = line.trim();
            if !id.is_empty() {
                seen.insert(id);
            }
        }

        info!(count = seen.len(), "Loaded previously seen listings");
        Ok(seen)
    }

    /// Durably append one id. Recording the same id twice is harmless.
    pub fn record(&self, id: &str) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e))?;

        writeln!(file, "{}", id).map_err(|e| self.error(e))?;
        file.sync_data().map_err(|e| self.error(e))?;

        debug!(id, "Saved listing id");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_load_initializes_empty_storage() {
        let dir = TempDir::new().unwrap();
        let store = SeenStore::new(dir.path().join("state").join("seen.txt"));

        let seen = store.load().unwrap();

        assert!(seen.is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn recorded_ids_survive_reload() {
        let dir = TempDir::new().unwrap();
        let store = SeenStore::new(dir.path().join("seen.txt"));
        store.load().unwrap();

        store.record("111").unwrap();
        store.record("222").unwrap();

        let seen = store.load().unwrap();
        assert!(seen.contains("111"));
        assert!(seen.contains("222"));
        assert!(!seen.contains("333"));
    }

    #[test]
    fn recording_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SeenStore::new(dir.path().join("seen.txt"));

        store.record("111").unwrap();
        store.record("111").unwrap();

        let seen = store.load().unwrap();
        assert!(seen.contains("111"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen.txt");
        fs::write(&path, "  111 \n\n222\n   \n").unwrap();

        let seen = SeenStore::new(&path).load().unwrap();

        assert_eq!(seen.len(), 2);
        assert!(seen.contains("111"));
    }

    #[test]
    fn unreadable_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let store = SeenStore::new(dir.path());

        assert!(store.load().is_err());
    }
}

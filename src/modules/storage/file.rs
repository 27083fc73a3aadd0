use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use super::{KeyValueStorage, StorageError};

/// Storage backed by a single JSON object file mapping slot keys to string values.
///
/// Every write reloads the file and replaces it whole through a temporary file
/// in the same directory, so a crash never leaves a half-written file. Two
/// processes writing at once can still lose an update.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every slot; a missing, unreadable or corrupt file yields an empty map
    fn load_slots(&self) -> BTreeMap<String, String> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read storage file {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        if data.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(&data) {
            Ok(slots) => slots,
            Err(e) => {
                warn!(
                    "Storage file {} is corrupt, treating as empty: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn save_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let data = serde_json::to_string_pretty(slots)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(data.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        debug!("Wrote {} slot(s) to {}", slots.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load_slots().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.load_slots();
        slots.insert(key.to_string(), value.to_string());
        self.save_slots(&slots)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.load_slots();
        if slots.remove(key).is_none() {
            return Ok(());
        }
        self.save_slots(&slots)
    }
}

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::io;

/// Errors raised while writing to a key-value slot
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous string key-value storage scoped to one origin.
///
/// Reads never fail: a slot that cannot be read is reported as absent.
/// Implementations use interior mutability so the credential store and the
/// session tracker can share one instance.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

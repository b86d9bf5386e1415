pub mod client_db;
pub mod memory;

pub use client_db::ClientDatabase;
pub use memory::MemoryStorage;
#[cfg(test)]
pub(crate) use memory::FailingStorage;

use std::fs;
use std::path::Path;

/// Storage key holding the raw session token.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key holding the JSON-serialized member profile.
pub const MEMBER_KEY: &str = "authMember";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Client-local durable key/value storage.
///
/// Values are plain strings; structured values are serialized by the caller.
/// Implementations must be usable from several handles at once.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Ensure the directory holding the database file exists
pub fn ensure_data_dir<P: AsRef<Path>>(db_path: P) -> std::io::Result<()> {
    if let Some(parent) = db_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

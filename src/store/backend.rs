//! # Storage backends.
//!
//! [`Storage`] is the narrow synchronous slot interface the [`Store`](super::Store)
//! sits on. Any medium that can get and overwrite a string under a key works.
//!
//! ## Implementations
//! - [`MemoryStorage`]: in-process slots; clones share the same slots, so every
//!   instance built from a clone observes the others' writes (one "browser profile").
//! - [`FileStorage`]: one file per key in a directory. Processes pointed at the same
//!   directory share the document, but not broadcasts (see [`Hub`](crate::Hub)).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::error::StoreError;

/// Synchronous key-value slot medium.
///
/// ### Implementation requirements
/// - A successful `set_item` is visible to the next `get_item` through the same handle.
/// - `set_item` overwrites the whole slot.
/// - Failures of the medium are returned, never swallowed.
pub trait Storage: Send + Sync + 'static {
    /// Returns the slot content, or `None` if the slot was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the slot content.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Shared in-memory slots.
///
/// Cheap to clone (internally holds an `Arc`). An optional per-slot quota makes
/// writes above the limit fail the way a full browser store does.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates empty storage without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle over the same slots that rejects values longer than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.read().map_err(|_| poisoned(key))?;
        Ok(slots.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(StoreError::Unavailable {
                    key: key.to_string(),
                    reason: format!("quota exceeded ({} > {limit} bytes)", value.len()),
                });
            }
        }
        let mut slots = self.slots.write().map_err(|_| poisoned(key))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn poisoned(key: &str) -> StoreError {
    StoreError::Unavailable {
        key: key.to_string(),
        reason: "slot lock poisoned".to_string(),
    }
}

/// File-per-key storage under a directory.
///
/// The slot for `key` lives at `<dir>/<key>.json`. Writes go to a sibling temp file
/// first and are renamed into place, so readers never see a half-written document.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates storage rooted at [`Config::resolved_data_dir`].
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.resolved_data_dir())
    }

    /// Returns the root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::Unavailable {
                key: key.to_string(),
                reason: "key is not a valid file name".to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_slots() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.get_item("other").unwrap(), None);
    }

    #[test]
    fn memory_quota_rejects_large_values() {
        let storage = MemoryStorage::new().with_quota(4);
        assert!(storage.set_item("k", "abcd").is_ok());
        let err = storage.set_item("k", "abcde").unwrap_err();
        assert_eq!(err.as_label(), "store_unavailable");
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("abcd"));
    }

    #[test]
    fn file_storage_round_trips_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("torn-chain").unwrap(), None);
        storage.set_item("torn-chain", "{}").unwrap();
        storage.set_item("torn-chain", "{\"apiRate\":1}").unwrap();
        assert_eq!(
            storage.get_item("torn-chain").unwrap().as_deref(),
            Some("{\"apiRate\":1}")
        );
        assert!(dir.path().join("nested/torn-chain.json").exists());
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.get_item("").is_err());
    }
}

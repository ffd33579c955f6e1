//! # Persistent document store.
//!
//! [`Store`] reads and writes the single [`Document`] under a fixed key of a
//! [`Storage`] backend. It keeps **no** in-memory copy: every `load` goes to the
//! medium, every `save` overwrites the whole slot.
//!
//! ## Rules
//! - `load` never fails on content (see [`Document::decode`]); only a failing medium errors.
//! - `save` failures propagate to the caller; there is no retry.
//! - A `save` is visible to the next `load` on the same backend immediately.
//!   Other instances learn about it through the broadcast channel, not the store.

mod backend;
mod document;

use std::sync::Arc;

pub use backend::{FileStorage, MemoryStorage, Storage};
pub use document::{DEFAULT_API_RATE, Document, Flags, Profile, ProfileId, Profiles, Throttle};

use crate::error::StoreError;

/// Document store over a shared storage backend.
///
/// Cheap to clone (internally holds an `Arc`).
#[derive(Clone)]
pub struct Store {
    storage: Arc<dyn Storage>,
    key: Arc<str>,
}

impl Store {
    /// Creates a store for `key` on the given backend.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<Arc<str>>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Returns the slot key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the document, applying defaults for anything missing or unusable.
    pub fn load(&self) -> Result<Document, StoreError> {
        let raw = self.storage.get_item(&self.key)?;
        Ok(Document::decode(raw.as_deref()))
    }

    /// Serializes and writes the full document, replacing the slot.
    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let json = doc.encode()?;
        self.storage.set_item(&self.key, &json)
    }

    /// Reads the values the UI needs at mount.
    pub fn flags(&self) -> Result<Flags, StoreError> {
        Ok(self.load()?.flags())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store() -> (Store, MemoryStorage) {
        let mem = MemoryStorage::new();
        (Store::new(Arc::new(mem.clone()), "torn-chain"), mem)
    }

    #[test]
    fn load_on_empty_slot_is_default() {
        let (store, _) = store();
        assert_eq!(store.load().unwrap(), Document::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (store, _) = store();
        let mut doc = Document::default();
        doc.api_token = Some("secret".into());
        doc.api_rate = 12;
        doc.running = false;
        doc.profiles
            .insert(Profile::new(7).with_field("name", "x"));
        doc.throttle = Some(Throttle(json!({"until": 1700000000})));

        store.save(&doc).unwrap();
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn save_writes_the_fixed_field_names() {
        let (store, mem) = store();
        store.save(&Document::default()).unwrap();

        let raw = mem.get_item("torn-chain").unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            v,
            json!({"apiToken": null, "apiRate": 30, "running": true, "profiles": {}})
        );
    }

    #[test]
    fn save_failure_propagates() {
        let mem = MemoryStorage::new().with_quota(8);
        let store = Store::new(Arc::new(mem), "torn-chain");
        assert!(matches!(
            store.save(&Document::default()),
            Err(StoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn flags_reflect_stored_token_and_rate() {
        let (store, mem) = store();
        mem.set_item("torn-chain", r#"{"apiToken":"t","apiRate":3}"#)
            .unwrap();
        let flags = store.flags().unwrap();
        assert_eq!(flags.api_token.as_deref(), Some("t"));
        assert_eq!(flags.api_rate, 3);
    }
}

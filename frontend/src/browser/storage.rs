use log::warn;
use web_sys::{window, Storage};

use crate::error::StoreError;
use crate::telemetry::event::FallbackEntry;
use crate::telemetry::storage::{decode_entries, encode_entries, EventStore};

fn local_storage() -> Result<Storage, StoreError> {
    window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StoreError::Unavailable)
}

pub fn get_item(key: &str) -> Option<String> {
    local_storage()
        .ok()
        .and_then(|storage| storage.get_item(key).ok())
        .flatten()
}

pub fn set_item(key: &str, value: &str) -> Result<(), StoreError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| StoreError::Write(key.to_string()))
}

/// Saves a batch of key/value pairs, logging the ones that fail.
pub fn set_items(items: &[(&str, String)]) {
    for (key, value) in items {
        if let Err(e) = set_item(key, value) {
            warn!("could not save {key}: {e}");
        }
    }
}

/// Fallback events in `localStorage` under a single JSON key.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    pub fn is_supported() -> bool {
        local_storage().is_ok()
    }
}

impl EventStore for LocalStorageStore {
    fn load(&self) -> Result<Vec<FallbackEntry>, StoreError> {
        let raw = local_storage()?
            .get_item(&self.key)
            .map_err(|_| StoreError::Read(self.key.clone()))?;
        decode_entries(raw.as_deref())
    }

    fn save(&self, entries: &[FallbackEntry]) -> Result<(), StoreError> {
        let raw = encode_entries(entries)?;
        set_item(&self.key, &raw)
    }

    fn clear(&self) -> Result<(), StoreError> {
        local_storage()?
            .remove_item(&self.key)
            .map_err(|_| StoreError::Write(self.key.clone()))
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use serde_json::Value;

use crate::error::StoreError;
use crate::telemetry::event::FallbackEntry;

/// Where undelivered events wait for the retry pass.
///
/// No locking: two tabs writing the same key race and the last write wins.
pub trait EventStore {
    fn load(&self) -> Result<Vec<FallbackEntry>, StoreError>;
    fn save(&self, entries: &[FallbackEntry]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;

    fn append(&self, entry: FallbackEntry) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.push(entry);
        self.save(&entries)
    }
}

/// Decode the stored JSON array entry by entry. Entries that don't decode
/// on their own are skipped; only a key that isn't a JSON array is an error.
pub fn decode_entries(raw: Option<&str>) -> Result<Vec<FallbackEntry>, StoreError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Vec::new()),
    };
    let values: Vec<Value> = serde_json::from_str(raw).map_err(StoreError::Decode)?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match FallbackEntry::from_json(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping fallback entry {i}: {e}");
                None
            }
        })
        .collect())
}

pub fn encode_entries(entries: &[FallbackEntry]) -> Result<String, StoreError> {
    serde_json::to_string(entries).map_err(StoreError::Encode)
}

/// In-memory store holding the same JSON text local storage would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    raw: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Rc::new(RefCell::new(Some(raw.to_string()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl EventStore for MemoryStore {
    fn load(&self) -> Result<Vec<FallbackEntry>, StoreError> {
        decode_entries(self.raw.borrow().as_deref())
    }

    fn save(&self, entries: &[FallbackEntry]) -> Result<(), StoreError> {
        *self.raw.borrow_mut() = Some(encode_entries(entries)?);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.raw.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::event::TrackedEvent;

    #[test]
    fn test_append_keeps_existing_entries() {
        let store = MemoryStore::default();
        let first = FallbackEntry::from_event(&TrackedEvent::new("a"), 0.0);
        let second = FallbackEntry::from_event(&TrackedEvent::new("b"), 10.0);
        store.append(first).unwrap();
        store.append(second).unwrap();

        let names: Vec<String> = store.load().unwrap().into_iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_json_is_a_decode_error() {
        let store = MemoryStore::with_raw("{not json");
        assert!(matches!(store.load(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_bad_entry_does_not_hide_the_rest() {
        let store = MemoryStore::with_raw(
            r#"[{"event":"a","data":{"k":"v"},"timestamp":"t"},{"data":{}},{"event":"b","data":{"x":null},"timestamp":"t"}]"#,
        );
        let names: Vec<String> = store.load().unwrap().into_iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_clear_removes_key() {
        let store = MemoryStore::with_raw("[]");
        store.clear().unwrap();
        assert_eq!(store.raw(), None);
        assert!(store.load().unwrap().is_empty());
    }
}

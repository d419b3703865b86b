//! Durable per-collection client state.
//!
//! A small JSON file of string values, each with its own expiry. Reads never
//! fail: missing, expired or malformed values are simply absent. Write errors
//! are logged and otherwise ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collection::CollectionId;

pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Per-collection value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SortColumn,
    SortDirection,
    Filter,
    RandomSeed,
    ShowHidden,
    ScrollOffset,
    VisibleColumns,
    ColumnWidths,
}

impl StorageKey {
    fn name(&self) -> &'static str {
        match self {
            Self::SortColumn => "sort",
            Self::SortDirection => "dir",
            Self::Filter => "filter",
            Self::RandomSeed => "seed",
            Self::ShowHidden => "show_hidden",
            Self::ScrollOffset => "scroll",
            Self::VisibleColumns => "columns",
            Self::ColumnWidths => "widths",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DurableStore {
    /// Backing file; `None` keeps everything in memory
    path: Option<PathBuf>,
    values: BTreeMap<String, StoredValue>,
    ttl: Duration,
}

impl DurableStore {
    /// Default state file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("playlist-grid").join("state.json"))
    }

    /// Open a file-backed store. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>, expiry_days: i64) -> Self {
        let path = path.into();
        let values = Self::read_file(&path);
        let mut store = Self {
            path: Some(path),
            values,
            ttl: Duration::days(expiry_days.max(1)),
        };
        store.prune(Utc::now());
        store
    }

    pub fn in_memory(expiry_days: i64) -> Self {
        Self {
            path: None,
            values: BTreeMap::new(),
            ttl: Duration::days(expiry_days.max(1)),
        }
    }

    pub fn get(&self, collection_id: CollectionId, key: StorageKey) -> Option<&str> {
        self.get_at(collection_id, key, Utc::now())
    }

    fn get_at(
        &self,
        collection_id: CollectionId,
        key: StorageKey,
        now: DateTime<Utc>,
    ) -> Option<&str> {
        self.values
            .get(&Self::key(collection_id, key))
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.value.as_str())
    }

    /// Read and decode a JSON value.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        collection_id: CollectionId,
        key: StorageKey,
    ) -> Option<T> {
        let raw = self.get(collection_id, key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring malformed {} for collection {}: {}", key.name(), collection_id, e);
                None
            }
        }
    }

    pub fn set(&mut self, collection_id: CollectionId, key: StorageKey, value: impl Into<String>) {
        let stored = StoredValue {
            value: value.into(),
            expires_at: Utc::now() + self.ttl,
        };
        self.values.insert(Self::key(collection_id, key), stored);
        self.flush();
    }

    pub fn set_json<T: Serialize>(
        &mut self,
        collection_id: CollectionId,
        key: StorageKey,
        value: &T,
    ) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(collection_id, key, json),
            Err(e) => warn!("Failed to encode {}: {}", key.name(), e),
        }
    }

    pub fn remove(&mut self, collection_id: CollectionId, key: StorageKey) {
        if self.values.remove(&Self::key(collection_id, key)).is_some() {
            self.flush();
        }
    }

    fn key(collection_id: CollectionId, key: StorageKey) -> String {
        format!("collection.{}.{}", collection_id, key.name())
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let before = self.values.len();
        self.values.retain(|_, stored| stored.expires_at > now);
        if self.values.len() != before {
            debug!("Dropped {} expired state values", before - self.values.len());
            self.flush();
        }
    }

    fn read_file(path: &Path) -> BTreeMap<String, StoredValue> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read state file {}: {}", path.display(), e);
                }
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring corrupt state file {}: {}", path.display(), e);
            BTreeMap::new()
        })
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        let result = serde_json::to_string_pretty(&self.values)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(path, json));
        if let Err(e) = result {
            warn!("Failed to write state file {}: {}", path.display(), e);
        }
    }

    #[cfg(test)]
    fn set_expiry(
        &mut self,
        collection_id: CollectionId,
        key: StorageKey,
        expires_at: DateTime<Utc>,
    ) {
        if let Some(stored) = self.values.get_mut(&Self::key(collection_id, key)) {
            stored.expires_at = expires_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_values_are_namespaced_by_collection() {
        let mut store = DurableStore::in_memory(DEFAULT_EXPIRY_DAYS);
        store.set(1, StorageKey::SortColumn, "title");
        store.set(2, StorageKey::SortColumn, "year");

        assert_eq!(store.get(1, StorageKey::SortColumn), Some("title"));
        assert_eq!(store.get(2, StorageKey::SortColumn), Some("year"));
        assert_eq!(store.get(3, StorageKey::SortColumn), None);

        store.remove(1, StorageKey::SortColumn);
        assert_eq!(store.get(1, StorageKey::SortColumn), None);
    }

    #[test]
    fn test_expired_values_read_as_absent() {
        let mut store = DurableStore::in_memory(DEFAULT_EXPIRY_DAYS);
        store.set(1, StorageKey::Filter, "ambient");
        store.set_expiry(1, StorageKey::Filter, Utc::now() - Duration::seconds(1));

        assert_eq!(store.get(1, StorageKey::Filter), None);

        // Writing again refreshes the expiry
        store.set(1, StorageKey::Filter, "ambient");
        assert_eq!(store.get(1, StorageKey::Filter), Some("ambient"));
        assert!(store
            .get_at(1, StorageKey::Filter, Utc::now() + Duration::days(29))
            .is_some());
        assert!(store
            .get_at(1, StorageKey::Filter, Utc::now() + Duration::days(31))
            .is_none());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = DurableStore::open(&path, 30);
        store.set(4, StorageKey::ScrollOffset, "1200");
        store.set_json(4, StorageKey::VisibleColumns, &vec!["title", "artist"]);
        drop(store);

        let reopened = DurableStore::open(&path, 30);
        assert_eq!(reopened.get(4, StorageKey::ScrollOffset), Some("1200"));
        let columns: Vec<String> = reopened.get_json(4, StorageKey::VisibleColumns).unwrap();
        assert_eq!(columns, vec!["title", "artist"]);
    }

    #[test]
    fn test_corrupt_file_and_values_fall_back_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = DurableStore::open(&path, 30);
        assert_eq!(store.get(1, StorageKey::SortColumn), None);

        store.set(1, StorageKey::ColumnWidths, "[broken");
        let widths: Option<BTreeMap<String, u16>> = store.get_json(1, StorageKey::ColumnWidths);
        assert!(widths.is_none());
    }
}

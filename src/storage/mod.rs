//! JSON-file persistence shared by the durable repository implementations.
//!
//! Each logical store is one JSON file holding a map of records. A missing
//! file is an empty store, and a record that fails to decode is dropped with
//! a warning so one bad entry never takes down the whole store.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Loads a `key -> record` map from `path`, tolerating absence and partial
/// corruption. Undecodable records are reset by omission; the caller sees
/// defaults for them on next access.
pub fn load_map<V: DeserializeOwned>(path: &Path) -> HashMap<String, V> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            warn!(path = %path.display(), %err, "Failed to read store, starting empty");
            return HashMap::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), %err, "Store file is not valid JSON, starting empty");
            return HashMap::new();
        }
    };

    let serde_json::Value::Object(entries) = value else {
        warn!(path = %path.display(), "Store file is not a JSON object, starting empty");
        return HashMap::new();
    };

    let mut map = HashMap::with_capacity(entries.len());
    for (key, entry) in entries {
        match serde_json::from_value(entry) {
            Ok(record) => {
                map.insert(key, record);
            }
            Err(err) => {
                warn!(path = %path.display(), key, %err, "Dropping corrupt record");
            }
        }
    }
    map
}

/// Serializes the whole map and writes it atomically (temp file + rename).
pub fn persist_map<V: Serialize>(path: &Path, map: &HashMap<String, V>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(map)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        count: u32,
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let map: HashMap<String, Record> = load_map(&dir.path().join("absent.json"));
        assert!(map.is_empty());
    }

    #[test]
    fn round_trips_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut map = HashMap::new();
        map.insert("alice".to_string(), Record { count: 3 });
        persist_map(&path, &map).unwrap();

        let loaded: HashMap<String, Record> = load_map(&path);
        assert_eq!(loaded, map);
    }

    #[test]
    fn corrupt_record_is_dropped_without_losing_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(
            &path,
            r#"{"alice": {"count": 3}, "bob": {"count": "not a number"}}"#,
        )
        .unwrap();

        let loaded: HashMap<String, Record> = load_map(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("alice"), Some(&Record { count: 3 }));
    }

    #[test]
    fn unreadable_top_level_resets_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let loaded: HashMap<String, Record> = load_map(&path);
        assert!(loaded.is_empty());
    }
}

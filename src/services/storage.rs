//! Snapshot storage collaborators

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{error::WidgetError, state::PersistedSnapshot};

/// Key-value store holding widget snapshots
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<PersistedSnapshot>, WidgetError>;
    fn set(&self, key: &str, snapshot: &PersistedSnapshot) -> Result<(), WidgetError>;
}

/// In-process store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, PersistedSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PersistedSnapshot>, WidgetError> {
        let entries = self.entries.lock()
            .map_err(|e| WidgetError::StorageUnavailable(format!("memory store lock: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, snapshot: &PersistedSnapshot) -> Result<(), WidgetError> {
        let mut entries = self.entries.lock()
            .map_err(|e| WidgetError::StorageUnavailable(format!("memory store lock: {}", e)))?;
        entries.insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}

/// JSON file holding one object that maps keys to snapshots. Unknown keys
/// written by other tools are kept intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_area(&self) -> Result<Map<String, Value>, WidgetError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(WidgetError::StorageUnavailable(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(WidgetError::CorruptSnapshot(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(WidgetError::CorruptSnapshot(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<PersistedSnapshot>, WidgetError> {
        let area = self.read_area()?;
        match area.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| WidgetError::CorruptSnapshot(format!("entry {}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, snapshot: &PersistedSnapshot) -> Result<(), WidgetError> {
        let _guard = self.write_lock.lock()
            .map_err(|e| WidgetError::StorageUnavailable(format!("file store lock: {}", e)))?;

        // A corrupt file is replaced rather than blocking every future write
        let mut area = self.read_area().unwrap_or_else(|e| {
            info!("Discarding unreadable store contents: {}", e);
            Map::new()
        });

        let value = serde_json::to_value(snapshot)
            .map_err(|e| WidgetError::StorageUnavailable(format!("failed to encode snapshot: {}", e)))?;
        area.insert(key.to_string(), value);

        let json = serde_json::to_string_pretty(&Value::Object(area))
            .map_err(|e| WidgetError::StorageUnavailable(format!("failed to encode store: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                WidgetError::StorageUnavailable(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                WidgetError::StorageUnavailable(format!("failed to write {}: {}", self.path.display(), e))
            })?;

        debug!("Snapshot {} written to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DisplayMode;
    use tempfile::tempdir;

    fn sample() -> PersistedSnapshot {
        PersistedSnapshot {
            target_duration_ms: 600_000,
            accumulated_ms: 42_000,
            running: true,
            start_instant: Some(1_700_000_000_000),
            mode: DisplayMode::Compact,
        }
    }

    #[test]
    fn memory_store_returns_what_was_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", &sample()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(sample()));
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_keeps_foreign_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"otherTool":{"x":1}}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store.set("k", &sample()).unwrap();

        assert_eq!(store.get("k").unwrap(), Some(sample()));
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["otherTool"]["x"], 1);
        assert_eq!(raw["k"]["accumulatedMs"], 42_000);
    }

    #[test]
    fn unparseable_file_is_reported_then_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("k"), Err(WidgetError::CorruptSnapshot(_))));

        store.set("k", &sample()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(sample()));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("a/b/state.json"));
        store.set("k", &sample()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn mistyped_start_restores_record_paused() {
        use std::sync::Arc;
        use crate::{
            clock::ManualClock,
            services::HeadlessWindow,
            state::{SurfaceKind, WidgetState, STORAGE_KEY},
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"meetingTimerStateV1":{"timeSetMs":600000,"accumulatedMs":5000,"running":true,"startTimestamp":"oops","mode":"small"}}"#,
        )
        .unwrap();

        let store = Arc::new(JsonFileStore::new(&path));
        let stored = store.get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(stored.start_instant, None);
        assert_eq!(stored.accumulated_ms, 5_000);

        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let host = Arc::new(HeadlessWindow::new(SurfaceKind::Popup.size_for(DisplayMode::Normal)));
        let widget = WidgetState::hydrate(clock.clone(), store, host, SurfaceKind::Popup);

        clock.advance_ms(10_000);
        let status = widget.status().unwrap();
        assert!(!status.running);
        assert_eq!(status.elapsed_ms, 5_000);
        assert_eq!(status.target_duration_ms, 600_000);
        assert_eq!(status.mode, DisplayMode::Compact);
    }
}

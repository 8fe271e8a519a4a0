//! Key/value settings store with change notifications.
//!
//! The gauge only reads from the store and listens to it; writes come from
//! the settings panel and from first-install provisioning.

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::{ChangeSet, GaugeConfig};

/// Error during store I/O
#[derive(Debug)]
pub struct StoreError {
    pub message: String,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

pub trait ConfigStore {
    /// Every stored key and its current value.
    fn get_all(&self) -> Map<String, Value>;

    /// Write the given keys. Subscribers receive one `ChangeSet` holding
    /// only the keys whose value actually changed.
    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError>;

    /// Register for change notifications.
    fn subscribe(&self) -> mpsc::Receiver<ChangeSet>;
}

#[derive(Default)]
struct Inner {
    values: Map<String, Value>,
    subscribers: Vec<mpsc::Sender<ChangeSet>>,
}

/// In-process store. Clones share the same values and subscribers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                values,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Merge `values`, hand the merged map to `persist`, and only when that
    /// succeeds make it current and notify subscribers.
    fn commit<F>(&self, values: Map<String, Value>, persist: F) -> Result<(), StoreError>
    where
        F: FnOnce(&Map<String, Value>) -> Result<(), StoreError>,
    {
        let mut inner = self.lock();
        let mut next = inner.values.clone();
        let mut changes = ChangeSet::new();
        for (key, value) in values {
            let old = next.get(&key).cloned();
            if old.as_ref() == Some(&value) {
                continue;
            }
            next.insert(key.clone(), value.clone());
            changes.insert(key, old, Some(value));
        }

        if changes.is_empty() {
            return Ok(());
        }

        persist(&next)?;
        inner.values = next;

        // Drop listeners whose receiving end is gone.
        inner
            .subscribers
            .retain(|tx| tx.send(changes.clone()).is_ok());
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn get_all(&self) -> Map<String, Value> {
        self.lock().values.clone()
    }

    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        self.commit(values, |_| Ok(()))
    }

    fn subscribe(&self) -> mpsc::Receiver<ChangeSet> {
        let (tx, rx) = mpsc::channel();
        self.lock().subscribers.push(tx);
        rx
    }
}

/// A [`MemoryStore`] persisted as pretty-printed JSON.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| StoreError {
                message: format!("Failed to read {}: {}", path.display(), e),
            })?;
            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!(
                        "Token Gauge: {} is not a JSON object, starting empty",
                        path.display()
                    );
                    Map::new()
                }
                Err(e) => {
                    return Err(StoreError {
                        message: format!("Invalid settings file {}: {}", path.display(), e),
                    })
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            memory: MemoryStore::with_values(values),
        })
    }

    /// `<config dir>/token-gauge/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("token-gauge").join("settings.json"))
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError {
                message: format!("Failed to create {}: {}", parent.display(), e),
            })?;
        }
        let body = serde_json::to_string_pretty(values)
            .map_err(|e| StoreError {
                message: format!("Failed to encode settings: {}", e),
            })?;
        std::fs::write(&self.path, body).map_err(|e| StoreError {
            message: format!("Failed to write {}: {}", self.path.display(), e),
        })
    }
}

impl ConfigStore for JsonFileStore {
    fn get_all(&self) -> Map<String, Value> {
        self.memory.get_all()
    }

    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        // Subscribers only hear about values that made it to disk.
        self.memory.commit(values, |next| self.persist(next))
    }

    fn subscribe(&self) -> mpsc::Receiver<ChangeSet> {
        self.memory.subscribe()
    }
}

/// Seed an empty store with the defaults. Returns `true` when seeding
/// happened (first install).
pub fn provision_defaults<S: ConfigStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    if !store.get_all().is_empty() {
        return Ok(false);
    }
    log::info!("Token Gauge: first run, provisioning default settings");
    store.set(GaugeConfig::default().to_values())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;
    use serde_json::json;

    fn one(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn set_notifies_only_changed_keys() {
        let store = MemoryStore::with_values(GaugeConfig::default().to_values());
        let rx = store.subscribe();

        let mut values = one(keys::POSITION, json!("top-left"));
        values.insert(keys::IS_ENABLED.to_string(), json!(true));
        store.set(values).unwrap();

        let changes = rx.try_recv().unwrap();
        assert_eq!(changes.len(), 1);
        let change = changes.get(keys::POSITION).unwrap();
        assert_eq!(change.old_value, Some(json!("bottom-right")));
        assert_eq!(change.new_value, Some(json!("top-left")));
    }

    #[test]
    fn unchanged_write_is_silent() {
        let store = MemoryStore::with_values(one(keys::IS_ENABLED, json!(true)));
        let rx = store.subscribe();
        store.set(one(keys::IS_ENABLED, json!(true))).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let store = MemoryStore::new();
        let rx = store.subscribe();
        let _kept = store.subscribe();
        drop(rx);
        store.set(one(keys::IS_ENABLED, json!(false))).unwrap();
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn provisioning_only_runs_once() {
        let store = MemoryStore::new();
        assert!(provision_defaults(&store).unwrap());
        assert_eq!(GaugeConfig::from_values(&store.get_all()), GaugeConfig::default());

        store.set(one(keys::TOKEN_LIMIT, json!(50000))).unwrap();
        assert!(!provision_defaults(&store).unwrap());
        assert_eq!(store.get_all()[keys::TOKEN_LIMIT], json!(50000));
    }

    #[test]
    fn json_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get_all().is_empty());
        assert!(provision_defaults(&store).unwrap());
        store.set(one(keys::POSITION, json!("top-right"))).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let config = GaugeConfig::from_values(&reopened.get_all());
        assert_eq!(config.position, crate::config::Position::TopRight);
        assert!(!provision_defaults(&reopened).unwrap());
    }

    #[test]
    fn failed_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::open(blocker.join("settings.json")).unwrap();
        let rx = store.subscribe();
        assert!(store.set(one(keys::IS_ENABLED, json!(false))).is_err());
        assert!(rx.try_recv().is_err());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(err.to_string().contains("Invalid settings file"));
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::KeyValueStore;
use crate::storage::types::Partition;

/// Local fallback store.
///
/// The session partition only ever lives in memory, so it disappears with the
/// process. The durable partition is mirrored to a single JSON object on disk
/// and rewritten after every mutation.
pub struct FileStorage {
    durable_path: PathBuf,
    session: Mutex<HashMap<String, String>>,
    durable: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    const DURABLE_FILE: &'static str = "local_storage.json";

    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            error!("Failed to create data dir {}: {}", base_path.display(), e);
            StorageError::WriteFailed(e.to_string())
        })?;
        let durable_path = base_path.join(Self::DURABLE_FILE);
        let durable = Self::load_durable(&durable_path);
        info!(
            "FileStorage initialized at {} ({} durable key(s))",
            base_path.display(),
            durable.len()
        );

        Ok(Self {
            durable_path,
            session: Mutex::new(HashMap::new()),
            durable: Mutex::new(durable),
        })
    }

    // A missing or unreadable file starts an empty partition rather than failing.
    fn load_durable(path: &Path) -> HashMap<String, String> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return HashMap::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!("Discarding corrupt durable store {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn persist(&self, durable: &HashMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(durable)?;
        let tmp = self.durable_path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            error!("Failed to write {}: {}", tmp.display(), e);
            StorageError::WriteFailed(e.to_string())
        })?;
        fs::rename(&tmp, &self.durable_path).map_err(|e| {
            error!("Failed to replace {}: {}", self.durable_path.display(), e);
            StorageError::WriteFailed(e.to_string())
        })?;
        debug!("Persisted {} durable key(s)", durable.len());
        Ok(())
    }

    // Caller holds the partition lock for the whole write.
    fn store_locked(
        &self,
        partition: Partition,
        map: &mut HashMap<String, String>,
        key: &str,
        value: String,
    ) -> Result<(), StorageError> {
        let previous = map.insert(key.to_string(), value);
        if partition == Partition::Durable {
            if let Err(e) = self.persist(map) {
                // keep memory and disk in step
                match previous {
                    Some(v) => map.insert(key.to_string(), v),
                    None => map.remove(key),
                };
                return Err(e);
            }
        }
        Ok(())
    }

    fn partition(&self, partition: Partition) -> MutexGuard<'_, HashMap<String, String>> {
        let lock = match partition {
            Partition::Session => &self.session,
            Partition::Durable => &self.durable,
        };
        lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.partition(partition).get(key).cloned())
    }

    fn set(&self, partition: Partition, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.partition(partition);
        self.store_locked(partition, &mut map, key, value.to_string())
    }

    fn delete(&self, partition: Partition, key: &str) -> Result<(), StorageError> {
        let mut map = self.partition(partition);
        let previous = map.remove(key);
        if partition == Partition::Durable && previous.is_some() {
            if let Err(e) = self.persist(&map) {
                if let Some(v) = previous {
                    map.insert(key.to_string(), v);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn update(
        &self,
        partition: Partition,
        key: &str,
        f: &mut dyn FnMut(Option<&str>) -> Result<Option<String>, StorageError>,
    ) -> Result<(), StorageError> {
        let mut map = self.partition(partition);
        match f(map.get(key).map(String::as_str))? {
            Some(value) => self.store_locked(partition, &mut map, key, value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete_per_partition() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set(Partition::Session, "user", "s").unwrap();
        storage.set(Partition::Durable, "user", "d").unwrap();
        assert_eq!(storage.get(Partition::Session, "user").unwrap().as_deref(), Some("s"));
        assert_eq!(storage.get(Partition::Durable, "user").unwrap().as_deref(), Some("d"));

        storage.delete(Partition::Session, "user").unwrap();
        assert_eq!(storage.get(Partition::Session, "user").unwrap(), None);
        assert_eq!(storage.get(Partition::Durable, "user").unwrap().as_deref(), Some("d"));

        // deleting twice is fine
        storage.delete(Partition::Session, "user").unwrap();
    }

    #[test]
    fn test_durable_survives_restart_session_does_not() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::new(dir.path()).unwrap();
            storage.set(Partition::Session, "user", "active").unwrap();
            storage.set(Partition::Durable, "playHive_trending", "[]").unwrap();
        }
        let reopened = FileStorage::new(dir.path()).unwrap();
        assert_eq!(reopened.get(Partition::Session, "user").unwrap(), None);
        assert_eq!(
            reopened.get(Partition::Durable, "playHive_trending").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_corrupt_durable_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("local_storage.json"), "{not json").unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get(Partition::Durable, "user").unwrap(), None);
        storage.set(Partition::Durable, "user", "fresh").unwrap();
        let reopened = FileStorage::new(dir.path()).unwrap();
        assert_eq!(reopened.get(Partition::Durable, "user").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_update_is_atomic_across_threads() {
        let dir = TempDir::new().unwrap();
        let storage = std::sync::Arc::new(FileStorage::new(dir.path()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        storage
                            .update(Partition::Durable, "count", &mut |current| {
                                let n: u32 = current.map_or(Ok(0), str::parse).unwrap();
                                Ok(Some((n + 1).to_string()))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(storage.get(Partition::Durable, "count").unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn test_update_can_skip_or_abort() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set(Partition::Durable, "k", "v").unwrap();

        storage.update(Partition::Durable, "k", &mut |_| Ok(None)).unwrap();
        assert_eq!(storage.get(Partition::Durable, "k").unwrap().as_deref(), Some("v"));

        let aborted = storage.update(Partition::Durable, "k", &mut |_| {
            Err(StorageError::CorruptRecord("bad".into()))
        });
        assert!(aborted.is_err());
        assert_eq!(storage.get(Partition::Durable, "k").unwrap().as_deref(), Some("v"));
    }
}

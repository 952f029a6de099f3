use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::StorageError;
use crate::persistence::keys::{watchlist_key, USERS_KEY, USER_KEY};
use crate::persistence::repository::{Repository, StoreKind};
use crate::session_management::session::User;
use crate::storage::storage_trait::KeyValueStore;
use crate::storage::types::Partition;
use crate::watchlist::types::MediaItem;

/// A locally registered account as kept in the durable partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalAccount {
    #[serde(flatten)]
    user: User,
    password: String,
}

/// `Repository` over the local key/value store.
///
/// Each user's watchlist sits under its own key, so every read and delete is
/// already scoped to its owner. Every mutation is a single `KeyValueStore::update`,
/// so concurrent writers never lose each other's changes.
pub struct FallbackRepository<'a> {
    store: &'a dyn KeyValueStore,
}

fn decode_list<T: DeserializeOwned>(json: Option<&str>) -> Result<Vec<T>, serde_json::Error> {
    match json {
        Some(json) => serde_json::from_str(json),
        None => Ok(Vec::new()),
    }
}

// An unreadable registry is treated as empty.
fn registry(json: Option<&str>) -> Vec<LocalAccount> {
    decode_list(json).unwrap_or_else(|e| {
        warn!("Ignoring corrupt local account registry: {}", e);
        Vec::new()
    })
}

impl<'a> FallbackRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    fn accounts(&self) -> Result<Vec<LocalAccount>, StorageError> {
        Ok(registry(self.store.get(Partition::Durable, USERS_KEY)?.as_deref()))
    }

    fn items(&self, user_id: &str) -> Result<Vec<MediaItem>, StorageError> {
        let json = self.store.get(Partition::Durable, &watchlist_key(user_id))?;
        Ok(decode_list(json.as_deref())?)
    }

    fn drop_account(&self, user_id: &str) -> Result<(), StorageError> {
        self.store.update(Partition::Durable, USERS_KEY, &mut |current| {
            let mut accounts = registry(current);
            accounts.retain(|a| a.user.id != user_id);
            Ok(Some(serde_json::to_string(&accounts)?))
        })
    }
}

impl Repository for FallbackRepository<'_> {
    fn kind(&self) -> StoreKind {
        StoreKind::Fallback
    }

    fn find_user_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .accounts()?
            .into_iter()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| a.user))
    }

    // The account and the last-registered-user key land together or not at all.
    fn insert_user(&self, user: &User, password: &str) -> Result<bool, StorageError> {
        let mut taken = false;
        self.store.update(Partition::Durable, USERS_KEY, &mut |current| {
            let mut accounts = registry(current);
            taken = accounts.iter().any(|a| a.user.email == user.email);
            if taken {
                return Ok(None);
            }
            accounts.push(LocalAccount {
                user: user.clone(),
                password: password.to_string(),
            });
            Ok(Some(serde_json::to_string(&accounts)?))
        })?;
        if taken {
            return Ok(false);
        }

        let last_user = serde_json::to_string(user)?;
        if let Err(e) = self.store.set(Partition::Durable, USER_KEY, &last_user) {
            if let Err(rollback) = self.drop_account(&user.id) {
                error!("Failed to roll back local account {}: {}", user.email, rollback);
            }
            return Err(e);
        }
        debug!("Registered local account {}", user.email);
        Ok(true)
    }

    fn list_watchlist(&self, user_id: &str, genre: Option<&str>) -> Result<Vec<MediaItem>, StorageError> {
        let mut items = self.items(user_id)?;
        if let Some(genre) = genre {
            items.retain(|item| item.genre == genre);
        }
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(items)
    }

    fn insert_watchlist_item(&self, user_id: &str, item: &MediaItem) -> Result<(), StorageError> {
        self.store
            .update(Partition::Durable, &watchlist_key(user_id), &mut |current| {
                let mut items: Vec<MediaItem> = decode_list(current).unwrap_or_else(|e| {
                    warn!("Replacing corrupt watchlist for user {}: {}", user_id, e);
                    Vec::new()
                });
                items.insert(0, item.clone());
                Ok(Some(serde_json::to_string(&items)?))
            })
    }

    fn delete_watchlist_item(&self, user_id: &str, item_id: &str) -> Result<(), StorageError> {
        self.store
            .update(Partition::Durable, &watchlist_key(user_id), &mut |current| {
                let mut items: Vec<MediaItem> = match decode_list(current) {
                    Ok(items) => items,
                    Err(e) => {
                        warn!("Nothing to remove from corrupt watchlist for user {}: {}", user_id, e);
                        return Ok(None);
                    }
                };
                let before = items.len();
                items.retain(|item| item.id != item_id);
                if items.len() == before {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_string(&items)?))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file_storage::FileStorage;
    use crate::watchlist::types::NewMediaItem;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    /// Local store whose writes to one key always fail.
    struct BrokenKey {
        inner: FileStorage,
        key: &'static str,
    }

    impl KeyValueStore for BrokenKey {
        fn get(&self, partition: Partition, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(partition, key)
        }

        fn set(&self, partition: Partition, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::WriteFailed("disk full".into()));
            }
            self.inner.set(partition, key, value)
        }

        fn delete(&self, partition: Partition, key: &str) -> Result<(), StorageError> {
            self.inner.delete(partition, key)
        }

        fn update(
            &self,
            partition: Partition,
            key: &str,
            f: &mut dyn FnMut(Option<&str>) -> Result<Option<String>, StorageError>,
        ) -> Result<(), StorageError> {
            self.inner.update(partition, key, f)
        }
    }

    #[test]
    fn test_registry_supports_several_accounts() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::new(dir.path()).unwrap();
        let repo = FallbackRepository::new(&store);
        assert!(repo.insert_user(&User::new("a", "Alice", "alice@example.com"), "pa").unwrap());
        assert!(repo.insert_user(&User::new("b", "Bob", "bob@example.com"), "pb").unwrap());
        assert!(!repo.insert_user(&User::new("c", "Alice 2", "alice@example.com"), "pc").unwrap());

        assert_eq!(repo.find_user_by_credentials("alice@example.com", "pa").unwrap().unwrap().id, "a");
        assert_eq!(repo.find_user_by_credentials("bob@example.com", "pb").unwrap().unwrap().id, "b");
        assert!(repo.find_user_by_credentials("bob@example.com", "pa").unwrap().is_none());

        // last registered user is remembered separately
        let last: User = serde_json::from_str(&store.get(Partition::Durable, USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(last.id, "b");
    }

    #[test]
    fn test_watchlist_newest_first_and_genre_filter() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::new(dir.path()).unwrap();
        let repo = FallbackRepository::new(&store);
        let now = Utc::now();
        let old = NewMediaItem::movie("Old", "l", "Drama").into_media_item("1".into(), now - Duration::hours(1));
        let new = NewMediaItem::movie("New", "l", "Comedy").into_media_item("2".into(), now);
        repo.insert_watchlist_item("u", &new).unwrap();
        repo.insert_watchlist_item("u", &old).unwrap();

        let all = repo.list_watchlist("u", None).unwrap();
        assert_eq!(all.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["2", "1"]);
        let drama = repo.list_watchlist("u", Some("Drama")).unwrap();
        assert_eq!(drama.len(), 1);
        assert_eq!(drama[0].id, "1");
        assert!(repo.list_watchlist("someone-else", None).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_watchlist_reported_then_replaced_on_insert() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::new(dir.path()).unwrap();
        store.set(Partition::Durable, &watchlist_key("u"), "{oops").unwrap();
        let repo = FallbackRepository::new(&store);
        assert!(matches!(repo.list_watchlist("u", None), Err(StorageError::CorruptRecord(_))));

        let item = NewMediaItem::movie("Flow", "l", "Animation").into_media_item("1".into(), Utc::now());
        repo.insert_watchlist_item("u", &item).unwrap();
        assert_eq!(repo.list_watchlist("u", None).unwrap(), vec![item]);
    }

    #[test]
    fn test_failed_registration_leaves_no_account() {
        let dir = TempDir::new().unwrap();
        let store = BrokenKey {
            inner: FileStorage::new(dir.path()).unwrap(),
            key: USER_KEY,
        };
        let repo = FallbackRepository::new(&store);
        let ann = User::new("a", "Ann", "ann@example.com");
        assert!(matches!(repo.insert_user(&ann, "pw"), Err(StorageError::WriteFailed(_))));
        assert_eq!(repo.find_user_by_credentials("ann@example.com", "pw").unwrap(), None);

        // a retry against a healthy store is not blocked by a half-written account
        let healthy = FallbackRepository::new(&store.inner);
        assert!(healthy.insert_user(&ann, "pw").unwrap());
    }

    #[test]
    fn test_delete_from_corrupt_watchlist_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::new(dir.path()).unwrap();
        store.set(Partition::Durable, &watchlist_key("u"), "not json").unwrap();
        let repo = FallbackRepository::new(&store);
        repo.delete_watchlist_item("u", "x").unwrap();
        assert_eq!(
            store.get(Partition::Durable, &watchlist_key("u")).unwrap().as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn test_concurrent_writers_keep_every_change() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStorage::new(dir.path()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    let repo = FallbackRepository::new(store.as_ref());
                    let mut registered = 0;
                    for i in 0..10 {
                        let item = NewMediaItem::movie("Flow", "l", "Animation")
                            .into_media_item(format!("{}-{}", t, i), Utc::now());
                        repo.insert_watchlist_item("u", &item).unwrap();
                        let user = User::new(format!("{}-{}", t, i), "Same".into(), "same@example.com".into());
                        if repo.insert_user(&user, "pw").unwrap() {
                            registered += 1;
                        }
                    }
                    registered
                })
            })
            .collect();
        let registered: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let repo = FallbackRepository::new(store.as_ref());
        assert_eq!(repo.list_watchlist("u", None).unwrap().len(), 80);
        assert_eq!(registered, 1);
        assert_eq!(repo.accounts().unwrap().len(), 1);
    }
}

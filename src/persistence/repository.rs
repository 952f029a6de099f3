use crate::error_handling::types::StorageError;
use crate::session_management::session::User;
use crate::watchlist::types::MediaItem;

/// Which store served an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Durable,
    Fallback,
}

/// The persistence capabilities the session and watchlist layers rely on.
///
/// Implemented once over the durable database and once over the local
/// key/value store. `PersistenceGateway::with_store` picks the implementation,
/// so callers write each operation a single time.
pub trait Repository {
    fn kind(&self) -> StoreKind;

    fn find_user_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>, StorageError>;

    /// Stores a new account unless its email is already registered.
    ///
    /// Check and insert are one atomic step; returns `false` when the email was taken.
    fn insert_user(&self, user: &User, password: &str) -> Result<bool, StorageError>;

    /// Newest first. `genre` filters by exact match.
    fn list_watchlist(&self, user_id: &str, genre: Option<&str>) -> Result<Vec<MediaItem>, StorageError>;

    fn insert_watchlist_item(&self, user_id: &str, item: &MediaItem) -> Result<(), StorageError>;

    /// Deletes `item_id` only if it belongs to `user_id`.
    fn delete_watchlist_item(&self, user_id: &str, item_id: &str) -> Result<(), StorageError>;
}

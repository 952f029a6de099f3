use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;

use crate::error_handling::types::StorageError;
use crate::persistence::gateway::PersistenceGateway;
use crate::persistence::repository::{Repository, StoreKind};
use crate::session_management::session::User;
use crate::storage::types::{Row, SqlValue};
use crate::watchlist::types::{MediaItem, MediaKind};

const WATCHLIST_COLUMNS: &str =
    "id, title, link, type, genre, season, episode, added_at, is_trending, thumbnail_url, embed_id";

/// `Repository` over the durable database, issuing statements through
/// `PersistenceGateway::run_query`.
pub struct DurableRepository<'a> {
    gateway: &'a PersistenceGateway,
}

impl<'a> DurableRepository<'a> {
    pub fn new(gateway: &'a PersistenceGateway) -> Self {
        Self { gateway }
    }
}

// Fixed-width UTC timestamps so that ORDER BY on the text column is chronological.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_user(row: &Row) -> Result<User, StorageError> {
    Ok(User {
        id: row.text("id")?,
        name: row.text("name")?,
        email: row.text("email")?,
        is_admin: row.flag("is_admin")?,
    })
}

fn episode_number(row: &Row, column: &str) -> Result<u32, StorageError> {
    let value = row
        .opt_integer(column)?
        .ok_or_else(|| StorageError::CorruptRecord(format!("series row without {}", column)))?;
    u32::try_from(value)
        .map_err(|_| StorageError::CorruptRecord(format!("{} out of range: {}", column, value)))
}

fn row_to_item(row: &Row) -> Result<MediaItem, StorageError> {
    let kind = match row.text("type")?.as_str() {
        "movie" => MediaKind::Movie,
        "series" => MediaKind::Series {
            season: episode_number(row, "season")?,
            episode: episode_number(row, "episode")?,
        },
        other => return Err(StorageError::CorruptRecord(format!("unknown media type {}", other))),
    };
    let added_at = DateTime::parse_from_rfc3339(&row.text("added_at")?)
        .map_err(|e| StorageError::CorruptRecord(format!("added_at: {}", e)))?
        .with_timezone(&Utc);
    Ok(MediaItem {
        id: row.text("id")?,
        title: row.text("title")?,
        link: row.text("link")?,
        kind,
        genre: row.text("genre")?,
        added_at,
        is_trending: row.flag("is_trending")?,
        thumbnail_url: row.opt_text("thumbnail_url")?,
        embed_id: row.opt_text("embed_id")?,
    })
}

impl Repository for DurableRepository<'_> {
    fn kind(&self) -> StoreKind {
        StoreKind::Durable
    }

    fn find_user_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        let rows = self.gateway.run_query(
            "SELECT id, name, email, is_admin FROM users WHERE email = ? AND password = ?",
            &[email.into(), password.into()],
        )?;
        rows.first().map(row_to_user).transpose()
    }

    fn insert_user(&self, user: &User, password: &str) -> Result<bool, StorageError> {
        let rows = self.gateway.run_query(
            "INSERT INTO users (id, name, email, password, is_admin) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(email) DO NOTHING RETURNING id",
            &[
                user.id.as_str().into(),
                user.name.as_str().into(),
                user.email.as_str().into(),
                password.into(),
                user.is_admin.into(),
            ],
        )?;
        Ok(!rows.is_empty())
    }

    fn list_watchlist(&self, user_id: &str, genre: Option<&str>) -> Result<Vec<MediaItem>, StorageError> {
        let rows = match genre {
            Some(genre) => self.gateway.run_query(
                &format!(
                    "SELECT {} FROM watchlist WHERE user_id = ? AND genre = ? ORDER BY added_at DESC, rowid DESC",
                    WATCHLIST_COLUMNS
                ),
                &[user_id.into(), genre.into()],
            )?,
            None => self.gateway.run_query(
                &format!(
                    "SELECT {} FROM watchlist WHERE user_id = ? ORDER BY added_at DESC, rowid DESC",
                    WATCHLIST_COLUMNS
                ),
                &[user_id.into()],
            )?,
        };
        // a bad row is skipped so it cannot knock the whole store into fallback
        Ok(rows
            .iter()
            .filter_map(|row| match row_to_item(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping unreadable watchlist row for user {}: {}", user_id, e);
                    None
                }
            })
            .collect())
    }

    fn insert_watchlist_item(&self, user_id: &str, item: &MediaItem) -> Result<(), StorageError> {
        self.gateway.run_query(
            &format!(
                "INSERT INTO watchlist (user_id, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                WATCHLIST_COLUMNS
            ),
            &[
                user_id.into(),
                item.id.as_str().into(),
                item.title.as_str().into(),
                item.link.as_str().into(),
                item.kind.as_str().into(),
                item.genre.as_str().into(),
                item.kind.season().map(i64::from).into(),
                item.kind.episode().map(i64::from).into(),
                format_timestamp(&item.added_at).into(),
                item.is_trending.into(),
                item.thumbnail_url.clone().into(),
                item.embed_id.clone().into(),
            ],
        )?;
        Ok(())
    }

    fn delete_watchlist_item(&self, user_id: &str, item_id: &str) -> Result<(), StorageError> {
        self.gateway.run_query(
            "DELETE FROM watchlist WHERE id = ? AND user_id = ?",
            &[item_id.into(), user_id.into()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let earlier = DateTime::parse_from_rfc3339("2025-01-01T09:00:00Z").unwrap().with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2025-01-01T10:00:00.5Z").unwrap().with_timezone(&Utc);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_series_row_without_episode_is_corrupt() {
        let mut row = Row::new();
        row.insert("id", SqlValue::Text("w".into()));
        row.insert("title", SqlValue::Text("Dark".into()));
        row.insert("link", SqlValue::Text("l".into()));
        row.insert("type", SqlValue::Text("series".into()));
        row.insert("genre", SqlValue::Text("Drama".into()));
        row.insert("season", SqlValue::Integer(1));
        row.insert("episode", SqlValue::Null);
        row.insert("added_at", SqlValue::Text("2025-01-01T00:00:00.000000Z".into()));
        row.insert("is_trending", SqlValue::Integer(0));
        assert!(matches!(row_to_item(&row), Err(StorageError::CorruptRecord(_))));

        row.insert("episode", SqlValue::Integer(3));
        let item = row_to_item(&row).unwrap();
        assert_eq!(item.kind, MediaKind::Series { season: 1, episode: 3 });
        assert_eq!(item.thumbnail_url, None);
    }

    #[test]
    fn test_insert_user_reports_taken_email() {
        let dir = tempfile::TempDir::new().unwrap();
        let (gateway, _db) = crate::persistence::test_support::durable_gateway(&dir);
        let repo = DurableRepository::new(&gateway);
        let ann = User::new("a", "Ann", "ann@example.com");
        assert!(repo.insert_user(&ann, "pw").unwrap());
        assert!(!repo.insert_user(&User::new("b", "Other Ann", "ann@example.com"), "x").unwrap());

        // the conflict is not a database failure
        assert!(!gateway.is_fallback_engaged());
        assert_eq!(repo.find_user_by_credentials("ann@example.com", "pw").unwrap(), Some(ann));
        assert_eq!(repo.find_user_by_credentials("ann@example.com", "x").unwrap(), None);
    }
}

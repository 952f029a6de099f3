use std::path::Path;

use log::{debug, error, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Column, Pool, Row as SqlxRow, Sqlite, TypeInfo, ValueRef,
};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Database;
use crate::storage::types::{Row, SqlValue};

/// Durable backend over a single SQLite file.
///
/// The pool is driven by a private current-thread runtime so the rest of the
/// crate can stay synchronous. Do not call into it from inside another tokio
/// runtime.
pub struct DatabaseStorage {
    rt: tokio::runtime::Runtime,
    pool: Pool<Sqlite>,
}

impl DatabaseStorage {
    /// Opens or creates the SQLite file at `path` and makes sure the schema exists.
    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::StoreUnavailable(format!("runtime: {}", e)))?;
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::StoreUnavailable(format!("create {}: {}", parent.display(), e))
            })?;
        }
        let pool = rt.block_on(async {
            let opts = SqliteConnectOptions::new()
                .filename(path_ref)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(opts)
                .await
                .map_err(|e| StorageError::StoreUnavailable(e.to_string()))?;
            // create schema
            sqlx::query(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL,
                    is_admin INTEGER NOT NULL DEFAULT 0
                );",
            )
            .execute(&pool)
            .await
            .map_err(|e| StorageError::StoreUnavailable(e.to_string()))?;
            sqlx::query(
                "CREATE TABLE IF NOT EXISTS watchlist (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    link TEXT NOT NULL,
                    type TEXT NOT NULL,
                    genre TEXT NOT NULL,
                    season INTEGER,
                    episode INTEGER,
                    added_at TEXT NOT NULL,
                    is_trending INTEGER NOT NULL DEFAULT 0,
                    thumbnail_url TEXT,
                    embed_id TEXT
                );",
            )
            .execute(&pool)
            .await
            .map_err(|e| StorageError::StoreUnavailable(e.to_string()))?;
            sqlx::query("CREATE INDEX IF NOT EXISTS watchlist_user_id ON watchlist (user_id);")
                .execute(&pool)
                .await
                .map_err(|e| StorageError::StoreUnavailable(e.to_string()))?;
            Ok::<_, StorageError>(pool)
        })?;
        info!("DatabaseStorage opened at {}", path_ref.display());
        Ok(Self { rt, pool })
    }
}

fn convert_row(row: &SqliteRow) -> Result<Row, StorageError> {
    let corrupt = |e: sqlx::Error| StorageError::CorruptRecord(e.to_string());
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i).map_err(corrupt)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get::<i64, _>(i).map_err(corrupt)?),
                "REAL" => SqlValue::Real(row.try_get::<f64, _>(i).map_err(corrupt)?),
                _ => SqlValue::Text(row.try_get::<String, _>(i).map_err(corrupt)?),
            }
        };
        out.insert(column.name(), value);
    }
    Ok(out)
}

impl Database for DatabaseStorage {
    fn run_query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.rt.block_on(async {
            let mut query = sqlx::query::<Sqlite>(statement);
            for param in params {
                query = match param {
                    SqlValue::Null => query.bind(None::<String>),
                    SqlValue::Integer(i) => query.bind(*i),
                    SqlValue::Real(r) => query.bind(*r),
                    SqlValue::Text(s) => query.bind(s.clone()),
                };
            }
            let rows = query.fetch_all(&self.pool).await.map_err(|e| {
                error!("Query failed ({}): {}", statement, e);
                StorageError::StoreUnavailable(e.to_string())
            })?;
            debug!("Query returned {} row(s): {}", rows.len(), statement);
            rows.iter().map(convert_row).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, DatabaseStorage) {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        let storage = DatabaseStorage::new_file(path).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_insert_and_select_user() {
        let (_dir, storage) = temp_db();
        storage
            .run_query(
                "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)",
                &["u-1".into(), "Alice".into(), "alice@example.com".into(), "pw".into()],
            )
            .unwrap();
        let rows = storage
            .run_query(
                "SELECT id, name, email, is_admin FROM users WHERE email = ? AND password = ?",
                &["alice@example.com".into(), "pw".into()],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("id").unwrap(), "u-1");
        assert_eq!(rows[0].text("name").unwrap(), "Alice");
        assert!(!rows[0].flag("is_admin").unwrap());

        let none = storage
            .run_query(
                "SELECT id FROM users WHERE email = ? AND password = ?",
                &["alice@example.com".into(), "wrong".into()],
            )
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_null_parameters_roundtrip() {
        let (_dir, storage) = temp_db();
        storage
            .run_query(
                "INSERT INTO watchlist (id, user_id, title, link, type, genre, season, episode, added_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    "w-1".into(),
                    "u-1".into(),
                    "Flow".into(),
                    "https://example.com/flow".into(),
                    "movie".into(),
                    "Animation".into(),
                    SqlValue::Null,
                    SqlValue::Null,
                    "2025-01-01T00:00:00+00:00".into(),
                ],
            )
            .unwrap();
        let rows = storage
            .run_query("SELECT season, episode FROM watchlist WHERE id = ?", &["w-1".into()])
            .unwrap();
        assert_eq!(rows[0].get("season"), Some(&SqlValue::Null));
        assert_eq!(rows[0].opt_integer("episode").unwrap(), None);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, storage) = temp_db();
        let insert = "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)";
        storage
            .run_query(insert, &["a".into(), "A".into(), "same@example.com".into(), "x".into()])
            .unwrap();
        let dup = storage.run_query(insert, &["b".into(), "B".into(), "same@example.com".into(), "y".into()]);
        assert!(matches!(dup, Err(StorageError::StoreUnavailable(_))));
    }

    #[test]
    fn test_bad_statement_is_unavailable() {
        let (_dir, storage) = temp_db();
        let result = storage.run_query("SELECT * FROM missing_table", &[]);
        assert!(matches!(result, Err(StorageError::StoreUnavailable(_))));
    }
}

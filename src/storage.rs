//! Storage subsystem
//!
//! This module provides the persistence primitives the gateway chooses between.
//!
//! Components:
//! - `storage_trait`: the `KeyValueStore` and `Database` traits.
//! - `types`: partitions, statement values and result rows.
//! - `database_storage`: durable SQLite implementation using sqlx.
//! - `file_storage`: local fallback with an in-memory session partition and a
//!   JSON-file durable partition.

pub mod database_storage;
pub mod file_storage;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use file_storage::FileStorage;
pub use storage_trait::{Database, KeyValueStore};
pub use types::{Partition, Row, SqlValue};

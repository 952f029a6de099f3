//! Storage Traits
//!
//! This module defines the two capability interfaces the persistence layer is
//! built on:
//! - `KeyValueStore`: a partitioned string key/value store (the local fallback)
//! - `Database`: a parameterized-statement store (the durable backend)
//!
//! All methods return a `Result` to handle potential storage errors.

use crate::error_handling::types::StorageError;
use crate::storage::types::{Partition, Row, SqlValue};

/// Partitioned key/value persistence.
///
/// Implementors must keep the `Session` partition scoped to the running
/// process and the `Durable` partition across restarts. Availability failures
/// are not expected from implementors; serialization problems are reported as
/// `StorageError::CorruptRecord`.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn get(&self, partition: Partition, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, partition: Partition, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, partition: Partition, key: &str) -> Result<(), StorageError>;

    /// Read-modify-write of one key, atomic with respect to every other call
    /// on the same partition.
    ///
    /// `f` receives the current value and returns the replacement, or `None`
    /// to leave the key untouched. An error from `f` aborts without writing.
    /// `f` must not call back into the store.
    fn update(
        &self,
        partition: Partition,
        key: &str,
        f: &mut dyn FnMut(Option<&str>) -> Result<Option<String>, StorageError>,
    ) -> Result<(), StorageError>;
}

/// Durable statement execution.
///
/// `statement` uses positional `?` placeholders bound in order from `params`.
/// Connection and execution failures surface as `StorageError::StoreUnavailable`.
pub trait Database: Send + Sync {
    fn run_query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError>;
}

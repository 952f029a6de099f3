use std::collections::HashMap;

use crate::error_handling::types::StorageError;

/// The two logical partitions of the local key/value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Cleared when the process ends. Holds the active session.
    Session,
    /// Survives restarts. Holds registered users, watchlists and the trending cache.
    Durable,
}

/// A positional statement parameter or a column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(value as i64)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, SqlValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, column: S, value: SqlValue) {
        self.columns.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    pub fn text(&self, column: &str) -> Result<String, StorageError> {
        match self.columns.get(column) {
            Some(SqlValue::Text(s)) => Ok(s.clone()),
            other => Err(StorageError::CorruptRecord(format!(
                "column {} is not text: {:?}",
                column, other
            ))),
        }
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, StorageError> {
        match self.columns.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Text(s)) => Ok(Some(s.clone())),
            other => Err(StorageError::CorruptRecord(format!(
                "column {} is not text: {:?}",
                column, other
            ))),
        }
    }

    pub fn opt_integer(&self, column: &str) -> Result<Option<i64>, StorageError> {
        match self.columns.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Integer(i)) => Ok(Some(*i)),
            other => Err(StorageError::CorruptRecord(format!(
                "column {} is not an integer: {:?}",
                column, other
            ))),
        }
    }

    /// Integer columns used as flags; NULL reads as false.
    pub fn flag(&self, column: &str) -> Result<bool, StorageError> {
        Ok(self.opt_integer(column)?.unwrap_or(0) != 0)
    }
}

//! Gateways wired over temporary directories, plus a database that is never reachable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use crate::configuration::types::StoreMode;
use crate::error_handling::types::StorageError;
use crate::persistence::gateway::PersistenceGateway;
use crate::persistence::state::ProcessState;
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::file_storage::FileStorage;
use crate::storage::storage_trait::{Database, KeyValueStore};
use crate::storage::types::{Row, SqlValue};

pub(crate) struct FailingDatabase {
    calls: AtomicUsize,
}

impl FailingDatabase {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Database for FailingDatabase {
    fn run_query(&self, _statement: &str, _params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::StoreUnavailable("connection refused".to_string()))
    }
}

fn local_store(dir: &TempDir) -> Arc<FileStorage> {
    Arc::new(FileStorage::new(dir.path().join("local")).unwrap())
}

fn gateway(
    database: Option<Arc<dyn Database>>,
    local: Arc<FileStorage>,
    mode: StoreMode,
) -> Arc<PersistenceGateway> {
    let state = Arc::new(ProcessState::new(mode, local.as_ref() as &dyn KeyValueStore));
    Arc::new(PersistenceGateway::new(database, local, state))
}

pub(crate) fn durable_gateway(dir: &TempDir) -> (Arc<PersistenceGateway>, Arc<DatabaseStorage>) {
    let db = Arc::new(DatabaseStorage::new_file(dir.path().join("test.sqlite3")).unwrap());
    let gw = gateway(Some(db.clone()), local_store(dir), StoreMode::Durable);
    (gw, db)
}

pub(crate) fn failing_gateway(
    dir: &TempDir,
    mode: StoreMode,
) -> (Arc<PersistenceGateway>, Arc<FailingDatabase>) {
    let db = Arc::new(FailingDatabase::new());
    let gw = gateway(Some(db.clone()), local_store(dir), mode);
    (gw, db)
}

pub(crate) fn fallback_gateway(dir: &TempDir) -> Arc<PersistenceGateway> {
    gateway(None, local_store(dir), StoreMode::Fallback)
}

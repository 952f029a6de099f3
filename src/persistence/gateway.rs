use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::error_handling::types::StorageError;
use crate::persistence::durable_repository::DurableRepository;
use crate::persistence::fallback_repository::FallbackRepository;
use crate::persistence::repository::Repository;
use crate::persistence::state::ProcessState;
use crate::storage::storage_trait::{Database, KeyValueStore};
use crate::storage::types::{Row, SqlValue};

/// Chooses, per operation, between the durable database and the local fallback.
///
/// Once fallback is engaged it stays engaged for the rest of the process; the
/// durable path is never retried.
pub struct PersistenceGateway {
    database: Option<Arc<dyn Database>>,
    local: Arc<dyn KeyValueStore>,
    state: Arc<ProcessState>,
}

impl PersistenceGateway {
    pub fn new(
        database: Option<Arc<dyn Database>>,
        local: Arc<dyn KeyValueStore>,
        state: Arc<ProcessState>,
    ) -> Self {
        let gateway = Self {
            database,
            local,
            state,
        };
        if gateway.database.is_none() {
            gateway.engage_fallback();
        }
        gateway
    }

    /// Runs one statement against the durable database.
    ///
    /// Returns `StoreUnavailable` without touching the database when fallback is
    /// engaged or no database is configured.
    pub fn run_query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        if self.is_fallback_engaged() {
            return Err(StorageError::StoreUnavailable("fallback engaged".to_string()));
        }
        match &self.database {
            Some(db) => db.run_query(statement, params),
            None => Err(StorageError::StoreUnavailable("no database configured".to_string())),
        }
    }

    pub fn is_fallback_engaged(&self) -> bool {
        self.state.is_fallback_engaged()
    }

    /// Idempotent and one-directional.
    pub fn engage_fallback(&self) {
        if self.state.engage_fallback() {
            warn!("Using local storage fallback for all persistence");
        }
    }

    /// Startup probe of the durable store. Engages fallback when it cannot answer.
    pub fn check_connection(&self) -> bool {
        if self.is_fallback_engaged() {
            info!("Fallback store in use, skipping database check");
            return false;
        }
        match self.run_query("SELECT 1", &[]) {
            Ok(_) => {
                info!("Database connection established");
                true
            }
            Err(e) => {
                error!("Database connection error: {}", e);
                self.engage_fallback();
                false
            }
        }
    }

    /// Runs `op` against the durable repository, or against the fallback
    /// repository when fallback is engaged or the durable attempt fails.
    ///
    /// A durable failure is logged and swallowed; only errors from the fallback
    /// store reach the caller. `op` may therefore run twice and must not have
    /// side effects outside the repository it is given.
    pub fn with_store<T, F>(&self, operation: &str, op: F) -> Result<T, StorageError>
    where
        F: Fn(&dyn Repository) -> Result<T, StorageError>,
    {
        if !self.is_fallback_engaged() {
            match op(&DurableRepository::new(self)) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    error!("Database error during {}: {}", operation, e);
                    self.engage_fallback();
                }
            }
        }
        debug!("Running {} against local storage", operation);
        op(&FallbackRepository::new(self.local.as_ref()))
    }

    pub fn local(&self) -> &dyn KeyValueStore {
        self.local.as_ref()
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }
}

//! Persistence gateway
//!
//! Decides whether an operation runs against the durable database or the
//! local fallback store, and owns the process-wide state both paths share.
//!
//! Components:
//! - `gateway`: `PersistenceGateway`, the sticky fallback switch.
//! - `repository`: the `Repository` capability interface.
//! - `durable_repository` / `fallback_repository`: its two implementations.
//! - `state`: `ProcessState`, the fallback flag and trending list.
//! - `keys`: fixed keys of the local storage layout.

pub mod durable_repository;
pub mod fallback_repository;
pub mod gateway;
pub mod keys;
pub mod repository;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use gateway::PersistenceGateway;
pub use repository::{Repository, StoreKind};
pub use state::ProcessState;

//! Error taxonomy shared by the storage, session and watchlist layers.

pub mod types;

pub use types::*;

//! Session management core module.
//!
//! This module provides the user identity type and the session manager that
//! logs users in and out, registers accounts and answers "who is the current
//! user" for the rest of the crate.

/// Submodule for the `User` identity type.
pub mod session;
/// Submodule for session manager implementation.
pub mod session_manager;

pub use session::User;
pub use session_manager::SessionManager;

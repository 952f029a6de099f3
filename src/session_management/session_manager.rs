use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::error_handling::types::{AuthError, StorageError};
use crate::persistence::gateway::PersistenceGateway;
use crate::persistence::keys::USER_KEY;
use crate::persistence::repository::StoreKind;
use crate::session_management::session::User;
use crate::storage::types::Partition;

const ADMIN_EMAIL: &str = "admin@email.com";
const ADMIN_PASSWORD: &str = "admin123";

/// Owns user identity.
///
/// The active session is the serialized `User` under the session partition's
/// `user` key, so there is never more than one. Credential lookups and
/// registrations go through the `PersistenceGateway`.
///
/// State machine: `Anonymous --login/register--> Authenticated --logout--> Anonymous`.
pub struct SessionManager {
    gateway: Arc<PersistenceGateway>,
}

impl SessionManager {
    pub fn new(gateway: Arc<PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Logs in and installs the session.
    ///
    /// The built-in admin pair is accepted before any store is consulted.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
            let admin = User {
                id: "admin-id".to_string(),
                name: "Admin".to_string(),
                email: ADMIN_EMAIL.to_string(),
                is_admin: true,
            };
            self.install_session(&admin)?;
            info!("Logged in as Admin");
            return Ok(admin);
        }

        let (kind, found) = self.gateway.with_store("login", |repo| {
            Ok((repo.kind(), repo.find_user_by_credentials(email, password)?))
        })?;

        match (found, kind) {
            (Some(user), _) => {
                self.install_session(&user)?;
                info!("Logged in {}", user.email);
                Ok(user)
            }
            (None, StoreKind::Durable) => Err(AuthError::InvalidCredentials),
            (None, StoreKind::Fallback) => Err(AuthError::AccountNotFound),
        }
    }

    /// Registers a new account and makes it the active session.
    ///
    /// Nothing is written when validation fails or the email is taken.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let user = User::new(Uuid::new_v4().to_string(), name.to_string(), email.to_string());
        let created = self
            .gateway
            .with_store("register", |repo| repo.insert_user(&user, password))?;
        if !created {
            return Err(AuthError::EmailTaken);
        }

        self.install_session(&user)?;
        info!("Registered and logged in {}", user.email);
        Ok(user)
    }

    /// Ends the session and forgets the last registered local user.
    pub fn logout(&self) -> Result<(), AuthError> {
        let local = self.gateway.local();
        local.delete(Partition::Session, USER_KEY)?;
        local.delete(Partition::Durable, USER_KEY)?;
        info!("Logged out");
        Ok(())
    }

    /// The session user, or, in fallback mode only, the last registered local user.
    pub fn get_current_user(&self) -> Option<User> {
        if let Some(user) = self.read_user(Partition::Session) {
            return Some(user);
        }
        if self.gateway.is_fallback_engaged() {
            return self.read_user(Partition::Durable);
        }
        None
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_current_user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.get_current_user().map_or(false, |u| u.is_admin)
    }

    fn install_session(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.gateway.local().set(Partition::Session, USER_KEY, &json)
    }

    // Unreadable records count as "no user".
    fn read_user(&self, partition: Partition) -> Option<User> {
        let json = match self.gateway.local().get(partition, USER_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error getting current user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Ignoring unreadable {:?} user record: {}", partition, e);
                None
            }
        }
    }
}

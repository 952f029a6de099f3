use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures raised by the storage backends.
///
/// `StoreUnavailable` never reaches callers of the session or watchlist
/// layers: the persistence gateway answers it by engaging the fallback store.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    StoreUnavailable(String),
    ReadFailed(String),
    WriteFailed(String),
    CorruptRecord(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::StoreUnavailable(e) => write!(f, "Storage unavailable: {}", e),
            StorageError::ReadFailed(e) => write!(f, "Storage read failed: {}", e),
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
            StorageError::CorruptRecord(e) => write!(f, "Corrupt record: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::CorruptRecord(err.to_string())
    }
}

#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingField(&'static str),
    PasswordMismatch,
    EmailTaken,
    InvalidCredentials,
    AccountNotFound,
    StorageError(StorageError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AuthError::PasswordMismatch => write!(f, "Passwords do not match"),
            AuthError::EmailTaken => write!(f, "Email already registered"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::AccountNotFound => write!(f, "Invalid account. Please register first."),
            AuthError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::StorageError(err)
    }
}

#[derive(Debug, PartialEq)]
pub enum WatchlistError {
    NotAuthenticated,
    NotAuthorized,
    MissingField(&'static str),
    InvalidItem(String),
    StorageError(StorageError),
}

impl fmt::Display for WatchlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchlistError::NotAuthenticated => write!(f, "User not authenticated"),
            WatchlistError::NotAuthorized => write!(f, "Only admin can add trending movies"),
            WatchlistError::MissingField(field) => write!(f, "Missing required field: {}", field),
            WatchlistError::InvalidItem(e) => write!(f, "Invalid media item: {}", e),
            WatchlistError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for WatchlistError {}

impl From<StorageError> for WatchlistError {
    fn from(err: StorageError) -> Self {
        WatchlistError::StorageError(err)
    }
}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    IoError(std::io::Error),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}

impl From<std::io::Error> for ControllerError {
    fn from(err: std::io::Error) -> Self {
        ControllerError::IoError(err)
    }
}

/// A shell line that could not be turned into a command.
#[derive(Debug, PartialEq)]
pub enum CommandError {
    UnterminatedQuote,
    UnknownCommand(String),
    Usage(&'static str),
    InvalidNumber(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnterminatedQuote => write!(f, "Unterminated quote"),
            CommandError::UnknownCommand(c) => write!(f, "Unknown command '{}', try 'help'", c),
            CommandError::Usage(u) => write!(f, "Usage: {}", u),
            CommandError::InvalidNumber(n) => write!(f, "Not a number: {}", n),
        }
    }
}

impl std::error::Error for CommandError {}

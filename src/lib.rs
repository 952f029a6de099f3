pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod persistence;
pub mod session_management;
pub mod storage;
pub mod watchlist;

pub use configuration::Config;
pub use controller::Controller;
pub use session_management::{SessionManager, User};
pub use watchlist::{MediaItem, MediaKind, NewMediaItem, WatchlistStore};

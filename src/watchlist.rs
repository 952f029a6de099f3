//! Watchlists and the trending catalogue.
//!
//! - `types`: `MediaItem`, `MediaKind` and the `NewMediaItem` input
//! - `trending`: genre list, seed catalogue, default thumbnails
//! - `watchlist_store`: the `WatchlistStore` operations

pub mod trending;
pub mod types;
pub mod watchlist_store;

pub use types::{MediaItem, MediaKind, NewMediaItem};
pub use watchlist_store::WatchlistStore;

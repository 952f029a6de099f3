use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use log::{info, warn};

use crate::configuration::types::StoreMode;
use crate::persistence::keys::TRENDING_KEY;
use crate::storage::storage_trait::KeyValueStore;
use crate::storage::types::Partition;
use crate::watchlist::trending::seed_trending;
use crate::watchlist::types::MediaItem;

/// Process-wide mutable state.
///
/// Built once at startup and shared by `Arc` with every component that needs
/// it. Holds the sticky fallback flag and the in-memory trending list; neither
/// is torn down before the process exits.
pub struct ProcessState {
    fallback_engaged: AtomicBool,
    trending: Mutex<Vec<MediaItem>>,
}

impl ProcessState {
    /// Initializes the flag from the configured mode and seeds the trending list
    /// from the durable cache, or the built-in catalogue when no usable cache exists.
    pub fn new(mode: StoreMode, local: &dyn KeyValueStore) -> Self {
        Self::with_trending(mode, load_trending(local))
    }

    pub fn with_trending(mode: StoreMode, trending: Vec<MediaItem>) -> Self {
        Self {
            fallback_engaged: AtomicBool::new(mode == StoreMode::Fallback),
            trending: Mutex::new(trending),
        }
    }

    pub fn is_fallback_engaged(&self) -> bool {
        self.fallback_engaged.load(Ordering::SeqCst)
    }

    /// Sets the flag; returns `true` only for the call that flipped it.
    pub(crate) fn engage_fallback(&self) -> bool {
        !self.fallback_engaged.swap(true, Ordering::SeqCst)
    }

    pub fn trending(&self) -> Vec<MediaItem> {
        self.trending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Edits the trending list under its lock.
    ///
    /// `f` works on a copy that replaces the list only when `f` succeeds, so a
    /// failed cache write inside `f` leaves the list as it was.
    pub(crate) fn update_trending<T, E>(
        &self,
        f: impl FnOnce(&mut Vec<MediaItem>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut trending = self.trending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = trending.clone();
        let value = f(&mut next)?;
        *trending = next;
        Ok(value)
    }
}

fn load_trending(local: &dyn KeyValueStore) -> Vec<MediaItem> {
    let cached = match local.get(Partition::Durable, TRENDING_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return seed_trending(Utc::now()),
        Err(e) => {
            warn!("Failed to read cached trending list: {}", e);
            return seed_trending(Utc::now());
        }
    };
    match serde_json::from_str::<Vec<MediaItem>>(&cached) {
        Ok(items) if !items.is_empty() => {
            info!("Loaded {} trending item(s) from cache", items.len());
            items
        }
        Ok(_) => seed_trending(Utc::now()),
        Err(e) => {
            warn!("Error parsing saved trending movies: {}", e);
            seed_trending(Utc::now())
        }
    }
}

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use log::{info, warn};
use uuid::Uuid;

use crate::error_handling::types::{StorageError, WatchlistError};
use crate::persistence::gateway::PersistenceGateway;
use crate::persistence::keys::TRENDING_KEY;
use crate::session_management::session::User;
use crate::session_management::session_manager::SessionManager;
use crate::storage::types::Partition;
use crate::watchlist::trending::{default_thumbnail, DEFAULT_TRENDING_GENRE, GENRES};
use crate::watchlist::types::{MediaItem, MediaKind, NewMediaItem};

/// Per-user watchlists and the global, admin-curated trending list.
pub struct WatchlistStore {
    gateway: Arc<PersistenceGateway>,
    sessions: Arc<SessionManager>,
}

impl WatchlistStore {
    pub fn new(gateway: Arc<PersistenceGateway>, sessions: Arc<SessionManager>) -> Self {
        Self { gateway, sessions }
    }

    /// The current user's items, newest first. Empty when nobody is logged in.
    pub fn get_watchlist(&self) -> Result<Vec<MediaItem>, WatchlistError> {
        self.list(None)
    }

    pub fn get_watchlist_by_genre(&self, genre: &str) -> Result<Vec<MediaItem>, WatchlistError> {
        self.list(Some(genre))
    }

    pub fn add_to_watchlist(&self, item: NewMediaItem) -> Result<MediaItem, WatchlistError> {
        let user = self.require_user()?;
        validate(&item)?;

        // microsecond precision survives every store unchanged
        let stored = item.into_media_item(Uuid::new_v4().to_string(), Utc::now().trunc_subsecs(6));
        self.gateway.with_store("add to watchlist", |repo| {
            repo.insert_watchlist_item(&user.id, &stored)
        })?;
        info!("Added {} to watchlist", stored.title);
        Ok(stored)
    }

    /// Removes `id` from the current user's watchlist. Unknown ids are ignored.
    pub fn remove_from_watchlist(&self, id: &str) -> Result<(), WatchlistError> {
        let user = self.require_user()?;
        self.gateway.with_store("remove from watchlist", |repo| {
            repo.delete_watchlist_item(&user.id, id)
        })?;
        info!("Removed {} from watchlist", id);
        Ok(())
    }

    /// Newest admin addition first. Needs no login.
    pub fn get_trending_movies(&self) -> Vec<MediaItem> {
        self.gateway.state().trending()
    }

    /// Prepends an entry to the trending list. Admin only.
    ///
    /// The whole list is cached in the durable partition before the in-memory
    /// copy changes, under the list's lock, so a failed write leaves both
    /// untouched and concurrent additions are never lost.
    pub fn add_trending_movie(&self, item: NewMediaItem) -> Result<MediaItem, WatchlistError> {
        if !self.sessions.is_admin() {
            return Err(WatchlistError::NotAuthorized);
        }
        require("title", &item.title)?;
        require("link", &item.link)?;
        require("embed id", item.embed_id.as_deref().unwrap_or_default())?;

        let mut item = item.trending();
        if item.genre.trim().is_empty() {
            item.genre = DEFAULT_TRENDING_GENRE.to_string();
        }
        if item.thumbnail_url.as_deref().map_or(true, |t| t.trim().is_empty()) {
            item.thumbnail_url = Some(default_thumbnail(&item.title));
        }
        validate(&item)?;

        let movie = item.into_media_item(Uuid::new_v4().to_string(), Utc::now().trunc_subsecs(6));
        self.gateway.state().update_trending(|trending| -> Result<(), StorageError> {
            trending.insert(0, movie.clone());
            let json = serde_json::to_string(trending)?;
            self.gateway
                .local()
                .set(Partition::Durable, TRENDING_KEY, &json)
        })?;
        info!("Added {} to trending movies", movie.title);
        Ok(movie)
    }

    pub fn get_all_genres(&self) -> &'static [&'static str] {
        &GENRES
    }

    fn require_user(&self) -> Result<User, WatchlistError> {
        self.sessions
            .get_current_user()
            .ok_or(WatchlistError::NotAuthenticated)
    }

    fn list(&self, genre: Option<&str>) -> Result<Vec<MediaItem>, WatchlistError> {
        let Some(user) = self.sessions.get_current_user() else {
            return Ok(Vec::new());
        };
        match self
            .gateway
            .with_store("get watchlist", |repo| repo.list_watchlist(&user.id, genre))
        {
            Ok(items) => Ok(items),
            Err(StorageError::CorruptRecord(e)) => {
                warn!("Error getting watchlist for {}: {}", user.id, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), WatchlistError> {
    if value.trim().is_empty() {
        return Err(WatchlistError::MissingField(field));
    }
    Ok(())
}

fn validate(item: &NewMediaItem) -> Result<(), WatchlistError> {
    require("title", &item.title)?;
    require("link", &item.link)?;
    require("genre", &item.genre)?;
    if let MediaKind::Series { season, episode } = item.kind {
        if season == 0 || episode == 0 {
            return Err(WatchlistError::InvalidItem(format!(
                "season and episode start at 1 (got S{}E{})",
                season, episode
            )));
        }
    }
    Ok(())
}

use log::{debug, error, info, warn};
use std::io::{BufRead, Write};
use std::sync::Arc;

use super::commands::{Command, HELP};
use crate::configuration::config::Config;
use crate::configuration::types::StoreMode;
use crate::error_handling::types::*;
use crate::persistence::gateway::PersistenceGateway;
use crate::persistence::state::ProcessState;
use crate::session_management::session_manager::SessionManager;
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::file_storage::FileStorage;
use crate::storage::storage_trait::{Database, KeyValueStore};
use crate::watchlist::types::{MediaItem, MediaKind, NewMediaItem};
use crate::watchlist::watchlist_store::WatchlistStore;

/// Wires the stores, the session manager and the watchlist together from a
/// `Config`, and drives them from a line-oriented shell.
pub struct Controller {
    pub config: Config,
    gateway: Arc<PersistenceGateway>,
    sessions: Arc<SessionManager>,
    watchlist: WatchlistStore,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Starting in {} mode", config.store_mode);
        config.validate()?;

        let local: Arc<dyn KeyValueStore> = Arc::new(FileStorage::new(&config.data_dir)?);
        let database: Option<Arc<dyn Database>> = match config.store_mode {
            StoreMode::Fallback => None,
            StoreMode::Durable => match DatabaseStorage::new_file(&config.database_path) {
                Ok(db) => Some(Arc::new(db)),
                Err(e) => {
                    error!(
                        "Unable to open database {}: {}",
                        config.database_path.display(),
                        e
                    );
                    None
                }
            },
        };

        let state = Arc::new(ProcessState::new(config.store_mode, local.as_ref()));
        let gateway = Arc::new(PersistenceGateway::new(database, local, state));
        gateway.check_connection();

        let sessions = Arc::new(SessionManager::new(gateway.clone()));
        let watchlist = WatchlistStore::new(gateway.clone(), sessions.clone());

        Ok(Self {
            config,
            gateway,
            sessions,
            watchlist,
        })
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Reads commands until `quit` or end of input.
    ///
    /// Only I/O errors on `input`/`output` end the loop early; every command
    /// failure is reported on `output` and the shell carries on.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), ControllerError> {
        writeln!(output, "PlayHive ready, type 'help' for commands")?;
        for line in input.lines() {
            let line = line?;
            debug!("Shell input: {}", line);
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(output, "{}", e)?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            self.execute(command, &mut output)?;
        }
        info!("Shell closed");
        Ok(())
    }

    pub fn execute<W: Write>(&self, command: Command, out: &mut W) -> Result<(), ControllerError> {
        match command {
            Command::Register {
                email,
                password,
                confirm_password,
                name,
            } => match self.sessions.register(&email, &password, &confirm_password, &name) {
                Ok(user) => writeln!(out, "Welcome, {}", user.name)?,
                Err(e) => writeln!(out, "Registration failed: {}", e)?,
            },
            Command::Login { email, password } => match self.sessions.login(&email, &password) {
                Ok(user) => writeln!(out, "Logged in as {}", user.name)?,
                Err(e) => writeln!(out, "Login failed: {}", e)?,
            },
            Command::Logout => match self.sessions.logout() {
                Ok(()) => writeln!(out, "Logged out")?,
                Err(e) => writeln!(out, "Logout failed: {}", e)?,
            },
            Command::WhoAmI => match self.sessions.get_current_user() {
                Some(user) if user.is_admin => writeln!(out, "{} <{}> (admin)", user.name, user.email)?,
                Some(user) => writeln!(out, "{} <{}>", user.name, user.email)?,
                None => writeln!(out, "Not logged in")?,
            },
            Command::List { genre } => {
                if !self.sessions.is_authenticated() {
                    writeln!(out, "Log in to see your watchlist")?;
                    return Ok(());
                }
                let items = match &genre {
                    Some(genre) => self.watchlist.get_watchlist_by_genre(genre),
                    None => self.watchlist.get_watchlist(),
                };
                match items {
                    Ok(items) if items.is_empty() => writeln!(out, "Watchlist is empty")?,
                    Ok(items) => write_items(out, &items)?,
                    Err(e) => writeln!(out, "Unable to load watchlist: {}", e)?,
                }
            }
            Command::AddMovie { title, link, genre } => {
                self.add(out, NewMediaItem::movie(title, link, genre))?
            }
            Command::AddSeries {
                title,
                link,
                genre,
                season,
                episode,
            } => self.add(out, NewMediaItem::series(title, link, genre, season, episode))?,
            Command::Remove { id } => match self.watchlist.remove_from_watchlist(&id) {
                Ok(()) => writeln!(out, "Removed {}", id)?,
                Err(e) => writeln!(out, "Unable to remove {}: {}", id, e)?,
            },
            Command::Trending => write_items(out, &self.watchlist.get_trending_movies())?,
            Command::AddTrending {
                title,
                link,
                embed_id,
                genre,
                thumbnail_url,
            } => {
                let mut item =
                    NewMediaItem::movie(title, link, genre.unwrap_or_default()).with_embed_id(embed_id);
                if let Some(url) = thumbnail_url {
                    item = item.with_thumbnail(url);
                }
                match self.watchlist.add_trending_movie(item) {
                    Ok(movie) => writeln!(out, "Added {} to trending", movie.title)?,
                    Err(e) => writeln!(out, "Unable to add trending movie: {}", e)?,
                }
            }
            Command::Genres => writeln!(out, "{}", self.watchlist.get_all_genres().join(", "))?,
            Command::Mode => {
                let mode = if self.gateway.is_fallback_engaged() {
                    "local storage (fallback)"
                } else {
                    "database"
                };
                writeln!(out, "Persistence: {}", mode)?
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit | Command::Empty => {}
        }
        Ok(())
    }

    fn add<W: Write>(&self, out: &mut W, item: NewMediaItem) -> Result<(), ControllerError> {
        match self.watchlist.add_to_watchlist(item) {
            Ok(item) => writeln!(out, "Added {} ({})", item.title, item.id)?,
            Err(WatchlistError::NotAuthenticated) => {
                warn!("Add to watchlist attempted without login");
                writeln!(out, "Log in to add to your watchlist")?
            }
            Err(e) => writeln!(out, "Unable to add: {}", e)?,
        }
        Ok(())
    }
}

fn write_items<W: Write>(out: &mut W, items: &[MediaItem]) -> std::io::Result<()> {
    for item in items {
        match item.kind {
            MediaKind::Movie => writeln!(out, "{}  {} [{}]", item.id, item.title, item.genre)?,
            MediaKind::Series { season, episode } => writeln!(
                out,
                "{}  {} S{:02}E{:02} [{}]",
                item.id, item.title, season, episode, item.genre
            )?,
        }
    }
    Ok(())
}

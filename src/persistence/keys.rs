//! Fixed keys of the local key/value layout.

/// Session partition: the active session's user. Durable partition: the last registered user.
pub const USER_KEY: &str = "user";

/// Durable partition: every locally registered account.
pub const USERS_KEY: &str = "playHive_users";

/// Durable partition: cached trending list.
pub const TRENDING_KEY: &str = "playHive_trending";

const WATCHLIST_PREFIX: &str = "playHive_watchlist";

/// Durable partition key holding one user's watchlist.
pub fn watchlist_key(user_id: &str) -> String {
    format!("{}_{}", WATCHLIST_PREFIX, user_id)
}

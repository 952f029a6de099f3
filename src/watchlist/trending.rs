//! Built-in catalogue data: genres, the default trending list and the
//! thumbnail pool used when an admin does not supply one.

use chrono::{DateTime, Utc};

use crate::watchlist::types::{MediaItem, MediaKind};

pub const GENRES: [&str; 8] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Fantasy",
    "Horror",
    "Science Fiction",
    "Thriller",
];

/// Genre given to trending entries submitted without one.
pub const DEFAULT_TRENDING_GENRE: &str = "Action";

const THUMBNAIL_POOL_SIZE: usize = 16;

// (id, title, slug, genre, embed id); thumbnails follow the id number.
const SEED: [(&str, &str, &str, &str, &str); 16] = [
    ("movie-1", "Captain America: Brave New World", "captain-america", "Action", "1pHDWnXmK7Y"),
    ("movie-2", "Moana 2", "moana-2", "Animation", "hDZ7y8RP5HE"),
    ("movie-3", "Flight Risk", "flight-risk", "Thriller", "ojC9JBuccJA"),
    ("movie-4", "Kraven", "kraven", "Action", "rze8QYwWGMs"),
    ("movie-5", "Flow", "flow", "Animation", "ZgZccxuj2RY"),
    ("movie-6", "Sonic 3", "sonic-3", "Adventure", "qSu6i2iFMO0"),
    ("movie-7", "The Gorge", "the-gorge", "Horror", "rUSdnuOLebE"),
    ("movie-8", "Mufasa", "mufasa", "Animation", "o17MF9vnabg"),
    ("movie-9", "Snow White", "snow-white", "Fantasy", "iV46TJKL8cU"),
    ("movie-10", "The Electric State", "electric-state", "Science Fiction", "KpN98z8Kf5E"),
    ("movie-11", "Batman Ninja vs Yakuza League", "batman-ninja", "Animation", "QleeDtH_WWE"),
    ("movie-12", "Demon City", "demon-city", "Horror", "q-djvN7i5us"),
    ("movie-13", "Venom The Last Dance", "venom-last-dance", "Action", "__2bjWbetsA"),
    ("movie-14", "Cleaner", "cleaner", "Thriller", "y_EG0MxwAO4"),
    ("movie-15", "Popye The Slayer Man", "popeye-slayer", "Comedy", "CGO32Zmh2YI"),
    ("movie-16", "Counter Strike", "counter-strike", "Action", "pEO34SeTsY0"),
];

/// The trending list used when no cached copy exists.
pub fn seed_trending(added_at: DateTime<Utc>) -> Vec<MediaItem> {
    SEED.iter()
        .enumerate()
        .map(|(i, (id, title, slug, genre, embed_id))| MediaItem {
            id: id.to_string(),
            title: title.to_string(),
            link: format!("https://example.com/{}", slug),
            kind: MediaKind::Movie,
            genre: genre.to_string(),
            added_at,
            is_trending: true,
            thumbnail_url: Some(format!("/mov{}.png", i + 1)),
            embed_id: Some(embed_id.to_string()),
        })
        .collect()
}

/// Picks a pool thumbnail from the title, so the same title always gets the same image.
pub fn default_thumbnail(title: &str) -> String {
    let hash = title
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    format!("/mov{}.png", hash % THUMBNAIL_POOL_SIZE + 1)
}

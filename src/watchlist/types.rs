use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movie or series. A series always carries its season and episode.
///
/// Serialized inline into `MediaItem` as `"type": "movie" | "series"` plus the
/// optional `season`/`episode` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series { season: u32, episode: u32 },
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series { .. } => "series",
        }
    }

    pub fn season(&self) -> Option<u32> {
        match self {
            MediaKind::Movie => None,
            MediaKind::Series { season, .. } => Some(*season),
        }
    }

    pub fn episode(&self) -> Option<u32> {
        match self {
            MediaKind::Movie => None,
            MediaKind::Series { episode, .. } => Some(*episode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub link: String,
    #[serde(flatten)]
    pub kind: MediaKind,
    pub genre: String,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<String>,
}

/// Caller-supplied fields of a `MediaItem`; the store assigns `id` and `added_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaItem {
    pub title: String,
    pub link: String,
    pub kind: MediaKind,
    pub genre: String,
    pub is_trending: bool,
    pub thumbnail_url: Option<String>,
    pub embed_id: Option<String>,
}

impl NewMediaItem {
    pub fn movie<S: Into<String>>(title: S, link: S, genre: S) -> Self {
        Self::new(title, link, genre, MediaKind::Movie)
    }

    pub fn series<S: Into<String>>(title: S, link: S, genre: S, season: u32, episode: u32) -> Self {
        Self::new(title, link, genre, MediaKind::Series { season, episode })
    }

    fn new<S: Into<String>>(title: S, link: S, genre: S, kind: MediaKind) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            kind,
            genre: genre.into(),
            is_trending: false,
            thumbnail_url: None,
            embed_id: None,
        }
    }

    pub fn with_thumbnail<S: Into<String>>(mut self, url: S) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_embed_id<S: Into<String>>(mut self, embed_id: S) -> Self {
        self.embed_id = Some(embed_id.into());
        self
    }

    pub fn trending(mut self) -> Self {
        self.is_trending = true;
        self
    }

    pub fn into_media_item(self, id: String, added_at: DateTime<Utc>) -> MediaItem {
        MediaItem {
            id,
            title: self.title,
            link: self.link,
            kind: self.kind,
            genre: self.genre,
            added_at,
            is_trending: self.is_trending,
            thumbnail_url: self.thumbnail_url,
            embed_id: self.embed_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_series_json_is_flat() {
        let item = NewMediaItem::series("Dark", "https://example.com/dark", "Drama", 2, 5)
            .into_media_item("s-1".into(), Utc::now());
        let value: Value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "series");
        assert_eq!(value["season"], 2);
        assert_eq!(value["episode"], 5);
        assert!(value.get("addedAt").is_some());

        let back: MediaItem = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind, MediaKind::Series { season: 2, episode: 5 });
    }

    #[test]
    fn test_movie_json_has_no_episode_fields() {
        let item = NewMediaItem::movie("Flow", "https://example.com/flow", "Animation")
            .into_media_item("m-1".into(), Utc::now());
        let value: Value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "movie");
        assert!(value.get("season").is_none());
        assert!(value.get("episode").is_none());
        assert!(value.get("thumbnailUrl").is_none());
    }

    #[test]
    fn test_series_without_season_is_rejected() {
        let json = r#"{"id":"x","title":"t","link":"l","type":"series","genre":"Drama",
                       "addedAt":"2025-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<MediaItem>(json).is_err());
    }
}

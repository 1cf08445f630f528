//! Minimal model of the recently-played response: only the fields the sync
//! engine consumes. Everything else the provider sends is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedPage {
    pub items: Vec<PlayEvent>,
}

/// One play event, most-recent-first in provider order. `played_at` is an
/// opaque ISO-8601 string used verbatim as the dedup natural key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEvent {
    pub played_at: String,
    pub track: TrackInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    pub album: AlbumInfo,
    pub artists: Vec<ArtistInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
}

impl PlayEvent {
    /// First artist only; the rest of the credits are not stored.
    pub fn primary_artist(&self) -> &str {
        self.track
            .artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or_default()
    }
}

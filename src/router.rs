use crate::db::TrackStorage;
use crate::handlers::{spotify_auth, tracks};
use crate::spotify::SpotifyClient;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct VaultState {
    pub storage: TrackStorage,
    pub spotify: Arc<SpotifyClient>,
}

impl VaultState {
    pub fn new(storage: TrackStorage, spotify: Arc<SpotifyClient>) -> Self {
        Self { storage, spotify }
    }
}

pub fn vault_router(state: VaultState) -> Router {
    Router::new()
        .route(
            "/api/tracks",
            post(tracks::insert_track).get(tracks::list_tracks),
        )
        .route("/api/tracks/{id}", get(tracks::get_track))
        .route("/api/s/auth", get(spotify_auth::authorize_entry))
        .route("/api/callback", get(spotify_auth::auth_callback))
        .route("/api/s/history", get(spotify_auth::live_history))
        .with_state(state)
}

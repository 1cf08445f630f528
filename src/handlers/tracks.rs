use crate::db::{NewPlay, PlayRecord};
use crate::error::VaultError;
use crate::router::VaultState;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InsertQuery {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
}

fn require_field(value: Option<String>, field: &str) -> Result<String, VaultError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(VaultError::InvalidInput(format!(
            "missing or empty required field `{field}`"
        ))),
    }
}

/// POST /api/tracks?artist=..&album=..&name=.. -> the stored record.
/// Manual submissions carry no `played_at`, so they never collide with the
/// sync engine's natural key.
pub async fn insert_track(
    State(state): State<VaultState>,
    Query(query): Query<InsertQuery>,
) -> Result<Json<PlayRecord>, VaultError> {
    let new = NewPlay {
        artist: require_field(query.artist, "artist")?,
        album: require_field(query.album, "album")?,
        name: require_field(query.name, "name")?,
        uri: String::new(),
        played_at: None,
    };

    let id = state.storage.insert_track(&new).await?;
    let record = state.storage.get_by_id(id).await?;
    Ok(Json(record))
}

/// GET /api/tracks/{id} -> a single record, 404 when absent.
pub async fn get_track(
    State(state): State<VaultState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayRecord>, VaultError> {
    let record = state.storage.get_by_id(id).await?;
    Ok(Json(record))
}

/// GET /api/tracks?page=N -> one keyset page, newest first. Page defaults
/// to 0 when omitted.
pub async fn list_tracks(
    State(state): State<VaultState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<PlayRecord>>, VaultError> {
    if query.page < 0 {
        return Err(VaultError::InvalidInput("`page` must be non-negative".into()));
    }
    let rows = state.storage.get_page(query.page).await?;
    Ok(Json(rows))
}

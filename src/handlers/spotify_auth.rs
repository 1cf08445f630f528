use crate::error::VaultError;
use crate::router::VaultState;
use crate::spotify::PlayEvent;

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/s/auth -> redirects to the provider consent page.
pub async fn authorize_entry(State(state): State<VaultState>) -> Redirect {
    let url = state.spotify.authorize_url();
    info!("dispatching authorization redirect");
    Redirect::temporary(url.as_str())
}

/// GET /api/callback -> exchanges the auth code for tokens and stores them.
/// The provider echoes our `state` parameter back; it is not validated
/// here. TODO: validate `state` once the flow keeps it across requests.
pub async fn auth_callback(
    State(state): State<VaultState>,
    Query(query): Query<AuthCallbackQuery>,
) -> Result<Json<Value>, VaultError> {
    if let Some(err) = query.error {
        return Err(VaultError::CallbackDenied(err));
    }
    let code = query
        .code
        .ok_or_else(|| VaultError::CallbackDenied("missing `code` in callback".to_string()))?;

    state.spotify.exchange_code(code).await?;
    info!("authorization callback stored credentials");
    Ok(Json(json!({ "status": "authorized" })))
}

/// GET /api/s/history -> live proxy of the remote feed, bypassing storage.
pub async fn live_history(
    State(state): State<VaultState>,
) -> Result<Json<Vec<PlayEvent>>, VaultError> {
    let items = state.spotify.fetch_recent().await?;
    Ok(Json(items))
}

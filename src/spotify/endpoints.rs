use crate::config::Config;
use crate::error::VaultError;
use crate::spotify::history::RecentlyPlayedPage;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, RefreshToken, Scope, StandardRevocableToken,
    TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenResponse,
    },
};
use tracing::info;
use url::Url;

/// Scope required to read the recently-played feed.
const HISTORY_SCOPE: &str = "user-read-recently-played";

/// Stateless Spotify endpoints.
pub(super) struct SpotifyEndpoints;

impl SpotifyEndpoints {
    /// Refresh the access token using the current refresh token.
    pub(super) async fn refresh_access_token(
        refresh_token: &str,
        client: &SpotifyOauth2Client,
        http_client: &reqwest::Client,
    ) -> Result<BasicTokenResponse, VaultError> {
        let token_result = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(http_client)
            .await?;
        info!("Access token refreshed successfully");
        Ok(token_result)
    }

    /// Exchange a one-time authorization code for the initial token set.
    pub(super) async fn exchange_authorization_code(
        code: String,
        client: &SpotifyOauth2Client,
        http_client: &reqwest::Client,
    ) -> Result<BasicTokenResponse, VaultError> {
        let token_result = client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(http_client)
            .await?;
        info!("Authorization code exchanged successfully");
        Ok(token_result)
    }

    /// Build the consent-page URL for the authorization-code flow.
    /// The returned `state` is carried by the provider but not validated
    /// on the callback; see the handler.
    pub(super) fn build_authorize_url(client: &SpotifyOauth2Client) -> (Url, CsrfToken) {
        client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(HISTORY_SCOPE.to_string()))
            .url()
    }

    /// One authorized GET against the recently-played endpoint. Non-2xx is
    /// an upstream error; the whole body must decode or the batch is lost.
    pub(super) async fn fetch_recently_played(
        access_token: &str,
        api_base: &Url,
        http_client: &reqwest::Client,
    ) -> Result<RecentlyPlayedPage, VaultError> {
        let url = api_base.join("v1/me/player/recently-played")?;
        let resp = http_client
            .get(url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(VaultError::UpstreamStatus(resp.status()));
        }

        let body = resp.bytes().await?;
        let page: RecentlyPlayedPage = serde_json::from_slice(&body)?;
        Ok(page)
    }
}

/// Build the Spotify OAuth2 client from app configuration.
pub(super) fn build_oauth2_client(cfg: &Config) -> Result<SpotifyOauth2Client, VaultError> {
    let auth_url = cfg.spotify_accounts_url.join("authorize")?;
    let token_url = cfg.spotify_accounts_url.join("api/token")?;

    let client = OAuth2Client::new(ClientId::new(cfg.spotify_client_id.clone()))
        .set_client_secret(ClientSecret::new(cfg.spotify_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(auth_url.as_str().to_string())?)
        .set_token_uri(TokenUrl::new(token_url.as_str().to_string())?)
        .set_redirect_uri(RedirectUrl::new(cfg.spotify_callback_url.clone())?);
    Ok(client)
}

pub(super) type SpotifyOauth2Client = OAuth2Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

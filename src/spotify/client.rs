use crate::config::Config;
use crate::db::TrackStorage;
use crate::db::schema::{KEY_ACCESS, KEY_ACCESS_VALIDITY, KEY_REFRESH};
use crate::error::VaultError;
use crate::spotify::endpoints::{SpotifyEndpoints, SpotifyOauth2Client, build_oauth2_client};
use crate::spotify::history::PlayEvent;

use backon::{ExponentialBuilder, Retryable};
use chrono::Utc;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Refresh this many seconds before the recorded expiry; absorbs clock skew
/// and in-flight request latency.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Assumed lifetime when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

fn default_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(3)
        .with_jitter()
}

/// Service object for the delegated Spotify credential and the history
/// feed. Owns the HTTP client and the stored token lifecycle; injected into
/// the router and the sync engine rather than living in a global.
pub struct SpotifyClient {
    storage: TrackStorage,
    oauth: SpotifyOauth2Client,
    http: reqwest::Client,
    api_base: Url,
    /// Serializes the whole check-refresh-store sequence so two callers
    /// cannot interleave grants against the token endpoint.
    refresh_lock: Mutex<()>,
}

impl SpotifyClient {
    pub fn new(storage: TrackStorage, cfg: &Config) -> Result<Self, VaultError> {
        let oauth = build_oauth2_client(cfg)?;
        let http = reqwest::Client::builder()
            .user_agent("trackvault/0.2")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            storage,
            oauth,
            http,
            api_base: cfg.spotify_api_url.clone(),
            refresh_lock: Mutex::new(()),
        })
    }

    /// URL of the provider consent page for the one-time authorization.
    /// The generated `state` parameter is sent but not validated on return.
    pub fn authorize_url(&self) -> Url {
        let (url, _csrf) = SpotifyEndpoints::build_authorize_url(&self.oauth);
        url
    }

    /// Guarantee a non-expired access token is stored. No network call when
    /// at least `REFRESH_MARGIN_SECS` of validity remain; otherwise one
    /// refresh-token grant, with stored credentials untouched on failure.
    pub async fn ensure_valid(&self) -> Result<(), VaultError> {
        let _guard = self.refresh_lock.lock().await;

        let expires_at = self
            .storage
            .conf_get(KEY_ACCESS_VALIDITY)
            .await?
            .parse::<i64>()
            .unwrap_or(0);
        let remaining = expires_at - Utc::now().timestamp();
        if remaining >= REFRESH_MARGIN_SECS {
            debug!(remaining, "access token still valid; skipping refresh");
            return Ok(());
        }

        let refresh_token = self.storage.conf_get(KEY_REFRESH).await?;
        if refresh_token.is_empty() {
            return Err(VaultError::MissingRefreshToken);
        }

        let retry_policy = default_retry_policy();
        let token = (|| async {
            SpotifyEndpoints::refresh_access_token(&refresh_token, &self.oauth, &self.http).await
        })
        .retry(retry_policy)
        .when(|e: &VaultError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("token refresh retrying after error {}, sleeping {:?}", err, dur);
        })
        .await?;

        self.store_token(&token).await
    }

    /// Authorization-code grant for the one-time callback; populates the
    /// stored credential exactly like a refresh.
    pub async fn exchange_code(&self, code: String) -> Result<(), VaultError> {
        let _guard = self.refresh_lock.lock().await;

        let retry_policy = default_retry_policy();
        let token = (|| async {
            SpotifyEndpoints::exchange_authorization_code(code.clone(), &self.oauth, &self.http)
                .await
        })
        .retry(retry_policy)
        .when(|e: &VaultError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("code exchange retrying after error {}, sleeping {:?}", err, dur);
        })
        .await?;

        if token.refresh_token().is_none() {
            warn!("token response carried no refresh_token; later refreshes will fail");
        }
        self.store_token(&token).await
    }

    /// Fetch the recently-played feed, most-recent-first as the provider
    /// returns it. Credential validity is ensured before the request.
    pub async fn fetch_recent(&self) -> Result<Vec<PlayEvent>, VaultError> {
        self.ensure_valid().await?;
        let access_token = self.storage.conf_get(KEY_ACCESS).await?;
        let page =
            SpotifyEndpoints::fetch_recently_played(&access_token, &self.api_base, &self.http)
                .await?;
        Ok(page.items)
    }

    /// Persist a token response: access token, rotated refresh token when
    /// the provider sends one (Spotify usually omits it), then the new
    /// expiry computed from mint time.
    async fn store_token(&self, token: &BasicTokenResponse) -> Result<(), VaultError> {
        let minted_at = Utc::now().timestamp();
        let expires_in = token
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        self.storage
            .conf_set(KEY_ACCESS, token.access_token().secret())
            .await?;
        if let Some(refresh) = token.refresh_token() {
            self.storage.conf_set(KEY_REFRESH, refresh.secret()).await?;
        }
        self.storage
            .conf_set(KEY_ACCESS_VALIDITY, &(minted_at + expires_in).to_string())
            .await?;
        Ok(())
    }
}

use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

/// Process-wide configuration, resolved once from the environment.
/// `dotenvy` is loaded by `main` before first access.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Figment::new()
        .merge(Env::raw())
        .extract()
        .expect("FATAL: invalid environment configuration")
});

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Spotify application client id (`SPOTIFY_CLIENT_ID`).
    #[serde(default)]
    pub spotify_client_id: String,
    /// Spotify application client secret (`SPOTIFY_CLIENT_SECRET`).
    #[serde(default)]
    pub spotify_client_secret: String,
    /// Redirect URI registered for the authorization-code flow
    /// (`SPOTIFY_CALLBACK_URL`).
    #[serde(default = "default_callback_url")]
    pub spotify_callback_url: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    /// Period of the background sync timer, in seconds.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Base URL of the accounts service (authorize + token endpoints).
    /// Overridable so tests can point at a local stand-in.
    #[serde(default = "default_accounts_url")]
    pub spotify_accounts_url: Url,
    /// Base URL of the Web API (recently-played endpoint).
    #[serde(default = "default_api_url")]
    pub spotify_api_url: Url,
}

impl Default for Config {
    fn default() -> Self {
        // No providers: every field falls back to its serde default.
        Figment::new()
            .extract()
            .expect("defaults are always extractable")
    }
}

fn default_callback_url() -> String {
    "http://localhost:6789/api/callback".to_string()
}

fn default_database_url() -> String {
    "sqlite:tracks.db".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:6789".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_accounts_url() -> Url {
    Url::parse("https://accounts.spotify.com/").expect("valid accounts base url")
}

fn default_api_url() -> Url {
    Url::parse("https://api.spotify.com/").expect("valid api base url")
}

use mimalloc::MiMalloc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trackvault::db::TrackStorage;
use trackvault::router::{VaultState, vault_router};
use trackvault::service::SyncEngine;
use trackvault::spotify::SpotifyClient;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &trackvault::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        callback_url = %cfg.spotify_callback_url,
        sync_interval_secs = cfg.sync_interval_secs,
        loglevel = %cfg.loglevel
    );

    let storage = TrackStorage::connect(&cfg.database_url).await?;
    storage.init_schema().await?;

    let spotify = Arc::new(SpotifyClient::new(storage.clone(), cfg)?);

    let engine = Arc::new(SyncEngine::new(
        storage.clone(),
        spotify.clone(),
        Duration::from_secs(cfg.sync_interval_secs),
    ));
    engine.spawn();

    let state = VaultState::new(storage, spotify);
    let app = vault_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

//! Timer-driven sync engine: fetch the remote feed, merge new plays into
//! storage exactly once per `played_at`.

use crate::db::{NewPlay, TrackStorage};
use crate::error::VaultError;
use crate::spotify::SpotifyClient;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

pub struct SyncEngine {
    storage: TrackStorage,
    spotify: Arc<SpotifyClient>,
    period: Duration,
    /// Single-flight guard: a cycle that outlives its tick must delay the
    /// next one, never overlap it.
    cycle_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(storage: TrackStorage, spotify: Arc<SpotifyClient>, period: Duration) -> Self {
        Self {
            storage,
            spotify,
            period,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run the fixed-interval sync loop on a background task. The first
    /// tick fires immediately, so one sync happens at startup.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = self.period.as_secs(), "sync engine started");
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// One fetch-then-merge cycle. Errors are logged and dropped; the
    /// engine self-heals on the next tick and never retries within a cycle.
    pub async fn run_cycle(&self) {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            debug!("sync cycle already in flight; skipping tick");
            return;
        };
        if let Err(e) = self.merge_recent().await {
            warn!(error = %e, "sync cycle failed; will retry on next tick");
        }
    }

    /// Merge fetched events oldest-first so an interrupted cycle always
    /// leaves a contiguous chronological prefix behind.
    async fn merge_recent(&self) -> Result<(), VaultError> {
        let events = self.spotify.fetch_recent().await?;
        let total = events.len();
        let mut inserted = 0usize;

        for event in events.into_iter().rev() {
            if self.storage.played_at_exists(&event.played_at).await? {
                debug!(
                    track = %event.track.name,
                    artist = %event.primary_artist(),
                    "already recorded; skipping"
                );
                continue;
            }

            debug!(
                track = %event.track.name,
                artist = %event.primary_artist(),
                played_at = %event.played_at,
                "inserting play"
            );
            let new = NewPlay {
                artist: event.primary_artist().to_string(),
                album: event.track.album.name.clone(),
                name: event.track.name.clone(),
                uri: event.track.uri.clone(),
                played_at: Some(event.played_at.clone()),
            };
            self.storage.insert_track(&new).await?;
            inserted += 1;
        }

        if inserted > 0 {
            info!(inserted, fetched = total, "sync cycle merged new plays");
        } else {
            debug!(fetched = total, "sync cycle found nothing new");
        }
        Ok(())
    }
}

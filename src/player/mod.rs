//! Player module - The orchestrator every caller talks to
//!
//! `Player` routes commands to whichever backend owns playback, predicts
//! track ends, walks the queue and caches playlists. Backend failures never
//! leave this layer: they are logged and turned into `false`, an empty
//! value or a placeholder.
//!
//! - `state`: active backend, playing flag, last song change
//! - `scheduler`: song-end prediction and automatic transition
//! - `navigation`: next/previous semantics
//! - `playlists`: playlist cache and aggregated listings

mod state;
mod scheduler;
mod navigation;
mod playlists;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::backend::{Backend, BackendRegistry};
use crate::config::SharedConfig;
use crate::error::{PlayerError, Result};
use crate::logging::log_failure;
use crate::model::{
    BackendId, EventSender, PlayQueue, PlayerEvent, PlayerState, PlaylistCache, SongDataShort,
    SongInfo,
};

pub use navigation::{Navigation, RESTART_THRESHOLD_SECS};
pub use playlists::PlaylistListings;
pub use scheduler::{
    transition_delay, SongEndScheduler, END_SLACK, END_THRESHOLD_SECS, SONG_CHANGE_DEBOUNCE,
};
pub use state::StateStore;

/// Unified playback orchestrator. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Player {
    pub(crate) backends: BackendRegistry,
    pub(crate) state: StateStore,
    pub(crate) queue: Arc<dyn PlayQueue>,
    pub(crate) config: SharedConfig,
    pub(crate) scheduler: SongEndScheduler,
    pub(crate) playlist_cache: PlaylistCache,
    pub(crate) listings: PlaylistListings,
    events: EventSender,
    /// Serializes play_song so overlapping requests apply in call order
    play_lock: Arc<Mutex<()>>,
}

fn or_default<T: Default>(operation: &'static str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        log_failure(operation, &e);
        T::default()
    })
}

impl Player {
    pub fn new(
        backends: BackendRegistry,
        queue: Arc<dyn PlayQueue>,
        config: SharedConfig,
        events: EventSender,
    ) -> Self {
        tracing::info!(backends = ?backends.ids(), "Player initialized");
        Self {
            backends,
            state: StateStore::new(),
            queue,
            config,
            scheduler: SongEndScheduler::new(),
            playlist_cache: PlaylistCache::new(),
            listings: PlaylistListings::default(),
            events,
            play_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_playlist_ttl(mut self, ttl: Duration) -> Self {
        self.playlist_cache = PlaylistCache::with_ttl(ttl);
        self
    }

    pub(crate) fn notify(&self, event: PlayerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No observer listening, dropping event");
        }
    }

    async fn active_backend(&self) -> Result<Arc<dyn Backend>> {
        let source = self
            .state
            .active_source()
            .await
            .ok_or(PlayerError::NoActiveSource)?;
        self.backends.get(source)
    }

    pub async fn get_player_state(&self) -> PlayerState {
        self.state.snapshot().await
    }

    /// Ask the active backend for its play state.
    ///
    /// Updates the playing flag and may arm the song-end transition.
    pub async fn get_current_song(&self) -> Result<SongInfo> {
        let backend = self.active_backend().await?;
        let info = backend.get_play_state().await?;

        self.state.set_playing(info.playing).await;
        self.check_song_end(&info).await;
        Ok(info)
    }

    /// Start `identifier` on `source`, making it the active backend.
    ///
    /// Returns `false` without touching any state if `source` has no
    /// registered backend. Otherwise `source` becomes the active backend
    /// before `play` is dispatched, so it stays active even when `play`
    /// fails. Failing to set the volume or to pause the previous backend
    /// does not stop playback.
    pub async fn play_song(&self, identifier: &str, source: BackendId) -> bool {
        let backend = match self.backends.get(source) {
            Ok(backend) => backend,
            Err(e) => {
                log_failure("play_song", &e);
                return false;
            }
        };

        let _serialized = self.play_lock.lock().await;
        self.state.mark_song_change().await;
        if self.scheduler.cancel().await {
            tracing::debug!("Cancelled pending song-end transition");
        }

        let volume = self.config.volume().await;
        if let Err(e) = backend.set_volume(volume).await {
            log_failure("set_volume", &e);
        }

        let previous = self.state.active_source().await;
        if let Some(previous) = previous.filter(|previous| *previous != source) {
            // Only one backend may produce audio
            let paused = async { self.backends.get(previous)?.pause_play(false).await }.await;
            if let Err(e) = paused {
                tracing::debug!(source = %previous, error = %e, "Could not pause previous backend");
            }
        }

        self.state.set_source(source).await;

        match backend.play(identifier).await {
            Ok(started) => {
                if started {
                    self.state.set_playing(true).await;
                }
                tracing::info!(identifier, source = %source, started, "Play requested");
                started
            }
            Err(e) => {
                log_failure("play", &e);
                false
            }
        }
    }

    /// `true` resumes, `false` pauses the active backend
    pub async fn pause_play(&self, play: bool) -> bool {
        let result = async { self.active_backend().await?.pause_play(play).await }.await;
        let done = or_default("pause_play", result);
        if done {
            self.state.set_playing(play).await;
        }
        done
    }

    pub async fn seek_current_song(&self, seconds: f64) -> bool {
        let result = async { self.active_backend().await?.seek(seconds.max(0.0)).await }.await;
        or_default("seek", result)
    }

    pub async fn set_volume(&self, percent: u8) -> bool {
        let percent = percent.min(100);
        let result = async { self.active_backend().await?.set_volume(percent).await }.await;
        or_default("set_volume", result)
    }

    /// Look a song up on any registered backend, active or not.
    ///
    /// Falls back to a placeholder titled "Unknown title".
    pub async fn song_from_id(&self, identifier: &str, source: BackendId) -> SongDataShort {
        let result = async { self.backends.get(source)?.song_from_id(identifier).await }.await;
        result.unwrap_or_else(|e| {
            log_failure("song_from_id", &e);
            SongDataShort::placeholder(identifier, source)
        })
    }
}

//! Single source of truth for the active backend and playing flag

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::model::{BackendId, PlayerState};

struct StoreInner {
    state: PlayerState,
    last_song_change: Instant,
}

/// Player state plus the "last song change" timestamp used to debounce
/// song-end predictions. Mutated only by the `Player`.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state: PlayerState::default(),
                last_song_change: Instant::now(),
            })),
        }
    }

    pub async fn snapshot(&self) -> PlayerState {
        self.inner.lock().await.state
    }

    pub async fn active_source(&self) -> Option<BackendId> {
        self.inner.lock().await.state.play_source
    }

    pub async fn set_playing(&self, playing: bool) {
        self.inner.lock().await.state.playing = playing;
    }

    /// Switch the active backend, returning the one it replaces
    pub async fn set_source(&self, source: BackendId) -> Option<BackendId> {
        self.inner.lock().await.state.play_source.replace(source)
    }

    pub async fn mark_song_change(&self) {
        self.inner.lock().await.last_song_change = Instant::now();
    }

    #[cfg(test)]
    pub async fn since_last_song_change(&self) -> Duration {
        self.inner.lock().await.last_song_change.elapsed()
    }

    /// Record a song change unless one happened within `min_gap`.
    ///
    /// Returns whether the change was recorded.
    pub async fn claim_song_change(&self, min_gap: Duration) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.last_song_change.elapsed() < min_gap {
            return false;
        }
        inner.last_song_change = Instant::now();
        true
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

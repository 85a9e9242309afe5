//! Song-end prediction
//!
//! Backends do not tell us when a track finishes. Every successful
//! `get_current_song` poll checks how much of the track is left; inside the
//! last second a one-shot transition to the next queue entry is armed.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::model::{PlayerEvent, SongInfo};

use super::Player;

/// Arm once less than this much of the track is left
pub const END_THRESHOLD_SECS: f64 = 1.0;
/// Minimum time between two recorded song changes
pub const SONG_CHANGE_DEBOUNCE: Duration = Duration::from_secs(2);
/// Fire slightly after the predicted end so the backend has finished
pub const END_SLACK: Duration = Duration::from_millis(50);

/// Delay until the transition should fire, or `None` if the track is not
/// about to end.
pub fn transition_delay(info: &SongInfo) -> Option<Duration> {
    let remaining = info.remaining_seconds();
    if info.total_seconds <= 0.0 || remaining >= END_THRESHOLD_SECS {
        return None;
    }
    Some(Duration::from_secs_f64(remaining.max(0.0)) + END_SLACK)
}

struct Armed {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    armed: Option<Armed>,
}

/// Holds at most one pending transition; arming replaces and aborts the
/// previous one.
#[derive(Clone, Default)]
pub struct SongEndScheduler {
    slot: Arc<Mutex<Slot>>,
}

impl SongEndScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `transition` after `delay` unless cancelled or re-armed first
    pub async fn arm(&self, delay: Duration, transition: BoxFuture<'static, ()>) {
        // Held while spawning so the task cannot look at the slot before
        // it has been registered there.
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        let generation = slot.generation;

        let owner = self.slot.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = owner.lock().await;
                match &slot.armed {
                    Some(armed) if armed.generation == generation => {
                        // Detach before running: the transition's own
                        // play_song cancels whatever is still armed.
                        slot.armed = None;
                    }
                    _ => return,
                }
            }
            tracing::debug!(generation, "Song-end transition firing");
            transition.await;
        });

        if let Some(previous) = slot.armed.replace(Armed { generation, handle }) {
            previous.handle.abort();
            tracing::debug!(
                generation = previous.generation,
                "Replaced pending song-end transition"
            );
        }
    }

    /// Abort the pending transition, if any
    pub async fn cancel(&self) -> bool {
        match self.slot.lock().await.armed.take() {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }

    pub async fn is_armed(&self) -> bool {
        self.slot.lock().await.armed.is_some()
    }

    /// How many transitions were armed over the scheduler's lifetime
    pub async fn times_armed(&self) -> u64 {
        self.slot.lock().await.generation
    }
}

impl Player {
    /// Arm the song-end transition when `info` says the track is in its
    /// last second and no song change was recorded in the last two seconds.
    pub(crate) async fn check_song_end(&self, info: &SongInfo) {
        let Some(delay) = transition_delay(info) else {
            return;
        };

        if !self.state.claim_song_change(SONG_CHANGE_DEBOUNCE).await {
            tracing::trace!(
                remaining = info.remaining_seconds(),
                "Song change too recent, not arming"
            );
            return;
        }

        tracing::info!(
            remaining = info.remaining_seconds(),
            delay_ms = delay.as_millis() as u64,
            "Track about to end, arming transition"
        );
        self.scheduler.arm(delay, self.on_song_ended()).await;
    }

    /// Advance to the next queue entry and tell the observer about it.
    ///
    /// Does nothing at the end of the queue.
    pub fn on_song_ended(&self) -> BoxFuture<'static, ()> {
        let player = self.clone();
        async move {
            let entries = player.queue.entries().await;
            let index = player.queue.current_index().await;

            let Some(entry) = entries.get(index + 1).cloned() else {
                tracing::info!(index, "Reached end of queue");
                return;
            };

            player.queue.set_current_index(index + 1).await;
            if !player.play_song(&entry.identifier, entry.source).await {
                tracing::warn!(
                    identifier = %entry.identifier,
                    source = %entry.source,
                    "Automatic transition failed to start playback"
                );
            }

            match player.get_current_song().await {
                Ok(info) => player.notify(PlayerEvent::CurrentSongChanged(info)),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read state after automatic transition")
                }
            }
        }
        .boxed()
    }
}

//! Next/previous over the external queue

use super::Player;

/// Pressing "previous" after this much playback restarts the track instead
pub const RESTART_THRESHOLD_SECS: f64 = 10.0;

/// What a next/previous press should do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Move the cursor to this index and play it
    Jump(usize),
    /// Seek the current track back to 0
    Restart,
    /// Nothing to do (end of queue)
    Stay,
}

impl Navigation {
    pub fn plan(next: bool, cursor: usize, queue_len: usize, elapsed_seconds: f64) -> Self {
        if next {
            return if cursor + 1 < queue_len {
                Navigation::Jump(cursor + 1)
            } else {
                Navigation::Stay
            };
        }

        if elapsed_seconds >= RESTART_THRESHOLD_SECS || cursor == 0 || cursor > queue_len {
            Navigation::Restart
        } else {
            Navigation::Jump(cursor - 1)
        }
    }
}

impl Player {
    /// Skip forward (`next`) or back in the queue.
    ///
    /// Returns `true` if the cursor moved or the track was restarted; `false`
    /// at the end of the queue or when nothing is playing.
    pub async fn play_next_prev(&self, next: bool) -> bool {
        let info = match self.get_current_song().await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(next, error = %e, "Navigation ignored, no current song");
                return false;
            }
        };

        let entries = self.queue.entries().await;
        let cursor = self.queue.current_index().await;
        let plan = Navigation::plan(next, cursor, entries.len(), info.elapsed_seconds);
        tracing::debug!(
            next,
            cursor,
            elapsed = info.elapsed_seconds,
            plan = ?plan,
            "Navigating queue"
        );

        match plan {
            Navigation::Jump(index) => {
                let Some(entry) = entries.get(index) else {
                    return false;
                };
                self.queue.set_current_index(index).await;
                if !self.play_song(&entry.identifier, entry.source).await {
                    tracing::warn!(
                        identifier = %entry.identifier,
                        source = %entry.source,
                        "Queue entry failed to start"
                    );
                }
                true
            }
            Navigation::Restart => self.seek_current_song(0.0).await,
            Navigation::Stay => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackendId, PlayQueue, QueueEntry};
    use crate::player::testing::harness;

    fn three_tracks() -> Vec<QueueEntry> {
        vec![
            QueueEntry::new("1", BackendId::Tidal),
            QueueEntry::new("2", BackendId::Spotify),
            QueueEntry::new("3", BackendId::Tidal),
        ]
    }

    #[test]
    fn plan_next() {
        assert_eq!(Navigation::plan(true, 0, 3, 0.0), Navigation::Jump(1));
        assert_eq!(Navigation::plan(true, 2, 3, 0.0), Navigation::Stay);
        assert_eq!(Navigation::plan(true, 0, 0, 0.0), Navigation::Stay);
    }

    #[test]
    fn plan_previous_threshold() {
        assert_eq!(Navigation::plan(false, 2, 3, 9.9), Navigation::Jump(1));
        assert_eq!(Navigation::plan(false, 2, 3, 10.0), Navigation::Restart);
        assert_eq!(Navigation::plan(false, 0, 3, 1.0), Navigation::Restart);
        // Cursor left behind by a shrunk queue
        assert_eq!(Navigation::plan(false, 7, 3, 1.0), Navigation::Restart);
    }

    #[tokio::test]
    async fn previous_early_goes_to_prior_track() {
        let h = harness(three_tracks());
        h.queue.set_current_index(1).await;
        assert!(h.player.play_song("2", BackendId::Spotify).await);
        h.spotify.set_position(9.9, 60.0).await;

        assert!(h.player.play_next_prev(false).await);
        assert_eq!(h.queue.current_index().await, 0);
        assert_eq!(h.tidal.count("play:1").await, 1);
        assert_eq!(
            h.player.get_player_state().await.play_source,
            Some(BackendId::Tidal)
        );
    }

    #[tokio::test]
    async fn previous_late_restarts_current_track() {
        let h = harness(three_tracks());
        h.queue.set_current_index(1).await;
        assert!(h.player.play_song("2", BackendId::Spotify).await);
        h.spotify.set_position(10.0, 60.0).await;

        assert!(h.player.play_next_prev(false).await);
        assert_eq!(h.queue.current_index().await, 1);
        assert_eq!(h.spotify.count("seek:0").await, 1);
        assert_eq!(h.tidal.count("play:").await, 0);
    }

    #[tokio::test]
    async fn previous_on_first_track_restarts() {
        let h = harness(three_tracks());
        assert!(h.player.play_song("1", BackendId::Tidal).await);
        h.tidal.set_position(3.0, 60.0).await;

        assert!(h.player.play_next_prev(false).await);
        assert_eq!(h.queue.current_index().await, 0);
        assert_eq!(h.tidal.state().await.elapsed_seconds, 0.0);
    }

    #[tokio::test]
    async fn next_advances_across_backends() {
        let h = harness(three_tracks());
        assert!(h.player.play_song("1", BackendId::Tidal).await);

        assert!(h.player.play_next_prev(true).await);
        assert_eq!(h.queue.current_index().await, 1);
        assert_eq!(h.spotify.count("play:2").await, 1);
        assert_eq!(h.tidal.count("pause_play:false").await, 1);
    }

    #[tokio::test]
    async fn next_at_end_of_queue_is_a_no_op() {
        let h = harness(three_tracks());
        h.queue.set_current_index(2).await;
        assert!(h.player.play_song("3", BackendId::Tidal).await);

        assert!(!h.player.play_next_prev(true).await);
        assert_eq!(h.queue.current_index().await, 2);
        assert_eq!(h.tidal.count("play:").await, 1);
    }

    #[tokio::test]
    async fn navigation_without_source_does_nothing() {
        let h = harness(three_tracks());

        assert!(!h.player.play_next_prev(true).await);
        assert!(!h.player.play_next_prev(false).await);
        assert_eq!(h.queue.current_index().await, 0);
    }
}

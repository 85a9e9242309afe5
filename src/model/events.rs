//! Outbound notifications for the UI layer

use tokio::sync::mpsc;

use super::types::{PlaylistDataShort, SongInfo};

/// Pushed to the observer without waiting for acknowledgment
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// Fresh snapshot after an automatic track transition
    CurrentSongChanged(SongInfo),
    /// Aggregated playlist listing of all playlist-capable backends
    PlaylistsChanged(Vec<PlaylistDataShort>),
}

pub type EventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

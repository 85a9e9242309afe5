//! Shared fixture for player tests

use std::sync::Arc;

use crate::backend::BackendRegistry;
use crate::backend::mock::MockBackend;
use crate::config::{PlayerConfig, SharedConfig};
use crate::model::{event_channel, BackendId, EventReceiver, MemoryQueue, QueueEntry};

use super::Player;

pub const TEST_VOLUME: u8 = 35;

pub struct Harness {
    pub player: Player,
    pub events: EventReceiver,
    pub queue: MemoryQueue,
    pub config: SharedConfig,
    /// Media daemon: no playlist support
    pub mpd: MockBackend,
    pub tidal: MockBackend,
    pub spotify: MockBackend,
}

/// Player over mpd, tidal and spotify mocks; YouTube stays unregistered
pub fn harness(entries: Vec<QueueEntry>) -> Harness {
    let mpd = MockBackend::new(BackendId::Mpd).without_playlists();
    let tidal = MockBackend::new(BackendId::Tidal);
    let spotify = MockBackend::new(BackendId::Spotify);

    let registry = BackendRegistry::new()
        .register(Arc::new(mpd.clone()))
        .register(Arc::new(tidal.clone()))
        .register(Arc::new(spotify.clone()));

    let queue = MemoryQueue::new(entries);
    let config = SharedConfig::new(PlayerConfig {
        volume: TEST_VOLUME,
        ..PlayerConfig::default()
    });
    let (events_tx, events) = event_channel();

    let player = Player::new(registry, Arc::new(queue.clone()), config.clone(), events_tx);

    Harness {
        player,
        events,
        queue,
        config,
        mpd,
        tidal,
        spotify,
    }
}

//! Backend module - The capability contract every playback backend implements
//!
//! - `registry`: maps a `BackendId` to its adapter instance
//! - `spotify`: Spotify Web API adapter

mod registry;
mod spotify;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::{PlayerError, Result};
use crate::model::{BackendId, PlaylistData, PlaylistDataShort, SongDataShort, SongInfo};

pub use registry::BackendRegistry;
pub use spotify::{setup_rspotify, SpotifyBackend};

/// Operations the player routes to a backend.
///
/// Commands report a success flag; transport failures are errors. Backends
/// that keep playlists override the playlist methods and return `true` from
/// `supports_playlists`; the defaults report `Unsupported`.
#[async_trait]
pub trait Backend: Send + Sync {
    fn id(&self) -> BackendId;

    async fn get_play_state(&self) -> Result<SongInfo>;

    async fn play(&self, identifier: &str) -> Result<bool>;

    /// `true` resumes, `false` pauses
    async fn pause_play(&self, play: bool) -> Result<bool>;

    async fn seek(&self, seconds: f64) -> Result<bool>;

    async fn set_volume(&self, percent: u8) -> Result<bool>;

    async fn song_from_id(&self, identifier: &str) -> Result<SongDataShort>;

    fn supports_playlists(&self) -> bool {
        false
    }

    async fn get_playlists(&self) -> Result<Vec<PlaylistDataShort>> {
        Err(PlayerError::unsupported(self.id(), "get_playlists"))
    }

    async fn get_playlist_data(&self, _playlist: &PlaylistDataShort) -> Result<PlaylistData> {
        Err(PlayerError::unsupported(self.id(), "get_playlist_data"))
    }

    async fn add_to_playlist(
        &self,
        _song: &SongDataShort,
        _playlist: &PlaylistDataShort,
    ) -> Result<bool> {
        Err(PlayerError::unsupported(self.id(), "add_to_playlist"))
    }

    async fn remove_from_playlist(
        &self,
        _song: &SongDataShort,
        _playlist: &PlaylistDataShort,
    ) -> Result<bool> {
        Err(PlayerError::unsupported(self.id(), "remove_from_playlist"))
    }
}

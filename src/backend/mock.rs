//! Scriptable backend for tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{PlayerError, Result};
use crate::model::{BackendId, PlaylistData, PlaylistDataShort, SongDataShort, SongInfo};

use super::Backend;

pub const DEFAULT_TOTAL_SECONDS: f64 = 60.0;

/// Records every call and answers from in-memory state.
///
/// `play` loads the track at 0s of `DEFAULT_TOTAL_SECONDS`. `set_failing`
/// makes every call return `BackendUnavailable`; `fail_on` does the same
/// for calls whose name starts with a prefix.
#[derive(Clone)]
pub struct MockBackend {
    id: BackendId,
    playlists_enabled: bool,
    failing: Arc<AtomicBool>,
    failing_calls: Arc<Mutex<Vec<&'static str>>>,
    calls: Arc<Mutex<Vec<String>>>,
    state: Arc<Mutex<SongInfo>>,
    volume: Arc<Mutex<Option<u8>>>,
    playlists: Arc<Mutex<Vec<PlaylistDataShort>>>,
    playlist_songs: Arc<Mutex<Vec<SongDataShort>>>,
}

impl MockBackend {
    pub fn new(id: BackendId) -> Self {
        Self {
            id,
            playlists_enabled: true,
            failing: Arc::new(AtomicBool::new(false)),
            failing_calls: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(SongInfo::default())),
            volume: Arc::new(Mutex::new(None)),
            playlists: Arc::new(Mutex::new(Vec::new())),
            playlist_songs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn without_playlists(mut self) -> Self {
        self.playlists_enabled = false;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn fail_on(&self, prefix: &'static str) {
        self.failing_calls.lock().await.push(prefix);
    }

    pub async fn set_position(&self, elapsed_seconds: f64, total_seconds: f64) {
        let mut state = self.state.lock().await;
        state.elapsed_seconds = elapsed_seconds;
        state.total_seconds = total_seconds;
    }

    pub async fn state(&self) -> SongInfo {
        self.state.lock().await.clone()
    }

    pub async fn volume(&self) -> Option<u8> {
        *self.volume.lock().await
    }

    pub async fn set_playlists(&self, playlists: Vec<PlaylistDataShort>) {
        *self.playlists.lock().await = playlists;
    }

    pub async fn set_playlist_songs(&self, songs: Vec<SongDataShort>) {
        *self.playlist_songs.lock().await = songs;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Number of recorded calls whose name starts with `prefix`
    pub async fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn playlist(&self, identifier: &str) -> PlaylistDataShort {
        PlaylistDataShort {
            identifier: identifier.to_string(),
            source: self.id,
            title: format!("{} playlist {}", self.id, identifier),
            owner: "tester".to_string(),
            track_count: 0,
        }
    }

    pub fn song(&self, identifier: &str) -> SongDataShort {
        SongDataShort {
            title: format!("Song {identifier}"),
            duration: DEFAULT_TOTAL_SECONDS,
            ..SongDataShort::placeholder(identifier, self.id)
        }
    }

    async fn record(&self, call: String) -> Result<()> {
        let fails = self.failing.load(Ordering::SeqCst)
            || self
                .failing_calls
                .lock()
                .await
                .iter()
                .any(|prefix| call.starts_with(prefix));
        self.calls.lock().await.push(call);
        // Give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        if fails {
            Err(PlayerError::unavailable(self.id, "mock failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn id(&self) -> BackendId {
        self.id
    }

    async fn get_play_state(&self) -> Result<SongInfo> {
        self.record("get_play_state".to_string()).await?;
        Ok(self.state.lock().await.clone())
    }

    async fn play(&self, identifier: &str) -> Result<bool> {
        self.record(format!("play:{identifier}")).await?;
        *self.state.lock().await = SongInfo {
            playing: true,
            elapsed_seconds: 0.0,
            total_seconds: DEFAULT_TOTAL_SECONDS,
            identifier: Some(identifier.to_string()),
        };
        Ok(true)
    }

    async fn pause_play(&self, play: bool) -> Result<bool> {
        self.record(format!("pause_play:{play}")).await?;
        self.state.lock().await.playing = play;
        Ok(true)
    }

    async fn seek(&self, seconds: f64) -> Result<bool> {
        self.record(format!("seek:{seconds}")).await?;
        self.state.lock().await.elapsed_seconds = seconds;
        Ok(true)
    }

    async fn set_volume(&self, percent: u8) -> Result<bool> {
        self.record(format!("set_volume:{percent}")).await?;
        *self.volume.lock().await = Some(percent);
        Ok(true)
    }

    async fn song_from_id(&self, identifier: &str) -> Result<SongDataShort> {
        self.record(format!("song_from_id:{identifier}")).await?;
        Ok(self.song(identifier))
    }

    fn supports_playlists(&self) -> bool {
        self.playlists_enabled
    }

    async fn get_playlists(&self) -> Result<Vec<PlaylistDataShort>> {
        if !self.playlists_enabled {
            return Err(PlayerError::unsupported(self.id, "get_playlists"));
        }
        self.record("get_playlists".to_string()).await?;
        Ok(self.playlists.lock().await.clone())
    }

    async fn get_playlist_data(&self, playlist: &PlaylistDataShort) -> Result<PlaylistData> {
        if !self.playlists_enabled {
            return Err(PlayerError::unsupported(self.id, "get_playlist_data"));
        }
        self.record(format!("get_playlist_data:{}", playlist.identifier))
            .await?;
        let songs = self.playlist_songs.lock().await.clone();
        Ok(PlaylistData::new(playlist.clone(), songs))
    }

    async fn add_to_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> Result<bool> {
        if !self.playlists_enabled {
            return Err(PlayerError::unsupported(self.id, "add_to_playlist"));
        }
        self.record(format!(
            "add_to_playlist:{}:{}",
            song.identifier, playlist.identifier
        ))
        .await?;
        self.playlist_songs.lock().await.push(song.clone());
        Ok(true)
    }

    async fn remove_from_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> Result<bool> {
        if !self.playlists_enabled {
            return Err(PlayerError::unsupported(self.id, "remove_from_playlist"));
        }
        self.record(format!(
            "remove_from_playlist:{}:{}",
            song.identifier, playlist.identifier
        ))
        .await?;
        self.playlist_songs.lock().await.retain(|s| s != song);
        Ok(true)
    }
}

//! Spotify Web API adapter

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use rspotify::{
    model::{FullTrack, PlayableId, PlayableItem, PlaylistId, TrackId},
    prelude::*,
    AuthCodeSpotify, Token,
};
use tokio::sync::RwLock;

use crate::error::{self, PlayerError};
use crate::log_backend_result;
use crate::model::{BackendId, PlaylistData, PlaylistDataShort, SongDataShort, SongInfo};

use super::Backend;

/// Refresh when less than this many seconds of token lifetime remain
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// Spotify backend with token refresh support
#[derive(Clone)]
pub struct SpotifyBackend {
    client: Arc<AuthCodeSpotify>,
    local_device_name: Option<String>,
    refresh_token: Arc<RwLock<String>>,
    token_expires_at: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl SpotifyBackend {
    pub fn new(
        client: AuthCodeSpotify,
        local_device_name: Option<String>,
        refresh_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            local_device_name,
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            token_expires_at: Arc::new(RwLock::new(expires_at)),
        }
    }

    pub async fn token_needs_refresh(&self) -> bool {
        match *self.token_expires_at.read().await {
            Some(exp) => (exp - Utc::now()).num_seconds() < TOKEN_REFRESH_MARGIN_SECS,
            None => false,
        }
    }

    pub async fn refresh_token_if_needed(&self) -> Result<bool> {
        if !self.token_needs_refresh().await {
            return Ok(false);
        }

        tracing::info!("Token expiring soon, refreshing...");
        let refresh_token = self.refresh_token.read().await.clone();

        match crate::auth::refresh_access_token(&refresh_token).await {
            Ok((token, new_refresh_token)) => {
                let expires_at = token.expires_at;
                *self
                    .client
                    .token
                    .lock()
                    .await
                    .map_err(|_| anyhow::anyhow!("Spotify token lock unavailable"))? = Some(token);

                *self.refresh_token.write().await = new_refresh_token;
                *self.token_expires_at.write().await = expires_at;

                tracing::info!("Token refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh token");
                Err(e)
            }
        }
    }

    async fn get_device_id(&self) -> Option<String> {
        let Ok(devices) = self.client.device().await else {
            tracing::debug!("Failed to get devices list");
            return None;
        };

        if let Some(device) = devices.iter().find(|d| d.is_active) {
            tracing::debug!(device_name = %device.name, "Found active device");
            return device.id.clone();
        }

        // No active device - fall back to our own
        if let Some(local_name) = &self.local_device_name {
            if let Some(device) = devices.iter().find(|d| &d.name == local_name) {
                tracing::debug!(
                    device_name = %device.name,
                    "No active device, using local device as fallback"
                );
                return device.id.clone();
            }
        }

        tracing::debug!(
            available_devices = devices.len(),
            "No active device found and local device not in list"
        );
        None
    }

    async fn current_play_state(&self) -> Result<SongInfo> {
        tracing::trace!("API: current_playback");
        let Some(playback) = self.client.current_playback(None, None::<Vec<_>>).await? else {
            return Ok(SongInfo::default());
        };

        let (total_ms, identifier) = match &playback.item {
            Some(PlayableItem::Track(track)) => (
                track.duration.num_milliseconds(),
                track.id.as_ref().map(|id| id.id().to_string()),
            ),
            Some(PlayableItem::Episode(episode)) => (
                episode.duration.num_milliseconds(),
                Some(episode.id.id().to_string()),
            ),
            _ => (0, None),
        };

        Ok(SongInfo {
            playing: playback.is_playing,
            elapsed_seconds: playback
                .progress
                .map(|d| d.num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0),
            total_seconds: total_ms as f64 / 1000.0,
            identifier,
        })
    }

    async fn play_track(&self, identifier: &str) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(identifier, device_id = ?device_id, "API: start_uris_playback");
        let id = TrackId::from_id_or_uri(identifier)?;
        self.client
            .start_uris_playback([PlayableId::Track(id)], device_id.as_deref(), None, None)
            .await?;
        Ok(())
    }

    async fn resume_or_pause(&self, play: bool) -> Result<()> {
        let device_id = self.get_device_id().await;
        if play {
            tracing::debug!(device_id = ?device_id, "API: resume_playback");
            self.client.resume_playback(device_id.as_deref(), None).await?;
        } else {
            tracing::debug!(device_id = ?device_id, "API: pause_playback");
            self.client.pause_playback(device_id.as_deref()).await?;
        }
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(seconds, device_id = ?device_id, "API: seek_track");
        let position = chrono::Duration::milliseconds((seconds.max(0.0) * 1000.0) as i64);
        self.client.seek_track(position, device_id.as_deref()).await?;
        Ok(())
    }

    async fn apply_volume(&self, volume: u8) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(volume, device_id = ?device_id, "API: volume");
        self.client.volume(volume.min(100), device_id.as_deref()).await?;
        Ok(())
    }

    async fn fetch_track(&self, identifier: &str) -> Result<SongDataShort> {
        let id = TrackId::from_id_or_uri(identifier)?;
        let track = self.client.track(id, None).await?;
        Ok(song_from_track(&track))
    }

    async fn fetch_playlists(&self) -> Result<Vec<PlaylistDataShort>> {
        let all_playlists: Vec<_> = self.client.current_user_playlists().try_collect().await?;

        Ok(all_playlists
            .into_iter()
            .map(|playlist| PlaylistDataShort {
                identifier: playlist.id.id().to_string(),
                source: BackendId::Spotify,
                title: playlist.name,
                owner: playlist
                    .owner
                    .display_name
                    .unwrap_or_else(|| playlist.owner.id.id().to_string()),
                track_count: playlist.tracks.total,
            })
            .collect())
    }

    async fn fetch_playlist_songs(
        &self,
        playlist: &PlaylistDataShort,
    ) -> Result<Vec<SongDataShort>> {
        let id = PlaylistId::from_id_or_uri(&playlist.identifier)?;
        let items: Vec<_> = self.client.playlist_items(id, None, None).try_collect().await?;

        Ok(items
            .iter()
            .filter_map(|item| match &item.track {
                Some(PlayableItem::Track(track)) => Some(song_from_track(track)),
                _ => None,
            })
            .collect())
    }

    async fn add_item(&self, song: &SongDataShort, playlist: &PlaylistDataShort) -> Result<()> {
        let playlist_id = PlaylistId::from_id_or_uri(&playlist.identifier)?;
        let track_id = TrackId::from_id_or_uri(&song.identifier)?;
        self.client
            .playlist_add_items(playlist_id, [PlayableId::Track(track_id)], None)
            .await?;
        Ok(())
    }

    async fn remove_item(&self, song: &SongDataShort, playlist: &PlaylistDataShort) -> Result<()> {
        let playlist_id = PlaylistId::from_id_or_uri(&playlist.identifier)?;
        let track_id = TrackId::from_id_or_uri(&song.identifier)?;
        self.client
            .playlist_remove_all_occurrences_of_items(
                playlist_id,
                [PlayableId::Track(track_id)],
                None,
            )
            .await?;
        Ok(())
    }
}

fn song_from_track(track: &FullTrack) -> SongDataShort {
    let artists: Vec<String> = track.artists.iter().map(|a| a.name.clone()).collect();
    SongDataShort {
        identifier: track
            .id
            .as_ref()
            .map(|id| id.id().to_string())
            .unwrap_or_default(),
        source: BackendId::Spotify,
        title: track.name.clone(),
        artist_string: artists.join(", "),
        artists,
        album: track.album.name.clone(),
        duration: track.duration.num_milliseconds() as f64 / 1000.0,
    }
}

fn unavailable(e: anyhow::Error) -> PlayerError {
    PlayerError::unavailable(BackendId::Spotify, e)
}

#[async_trait]
impl Backend for SpotifyBackend {
    fn id(&self) -> BackendId {
        BackendId::Spotify
    }

    async fn get_play_state(&self) -> error::Result<SongInfo> {
        self.current_play_state().await.map_err(unavailable)
    }

    async fn play(&self, identifier: &str) -> error::Result<bool> {
        let result = self.play_track(identifier).await.map(|_| true).map_err(unavailable);
        log_backend_result!("play", result);
        result
    }

    async fn pause_play(&self, play: bool) -> error::Result<bool> {
        let result = self.resume_or_pause(play).await.map(|_| true).map_err(unavailable);
        log_backend_result!("pause_play", result);
        result
    }

    async fn seek(&self, seconds: f64) -> error::Result<bool> {
        let result = self.seek_to(seconds).await.map(|_| true).map_err(unavailable);
        log_backend_result!("seek", result);
        result
    }

    async fn set_volume(&self, percent: u8) -> error::Result<bool> {
        let result = self.apply_volume(percent).await.map(|_| true).map_err(unavailable);
        log_backend_result!("set_volume", result);
        result
    }

    async fn song_from_id(&self, identifier: &str) -> error::Result<SongDataShort> {
        self.fetch_track(identifier).await.map_err(|e| {
            tracing::debug!(identifier, error = %e, "Track lookup failed");
            PlayerError::not_found(BackendId::Spotify, identifier)
        })
    }

    fn supports_playlists(&self) -> bool {
        true
    }

    async fn get_playlists(&self) -> error::Result<Vec<PlaylistDataShort>> {
        let result = self.fetch_playlists().await.map_err(unavailable);
        log_backend_result!("get_playlists", result);
        result
    }

    async fn get_playlist_data(&self, playlist: &PlaylistDataShort) -> error::Result<PlaylistData> {
        let songs = self.fetch_playlist_songs(playlist).await.map_err(unavailable)?;
        tracing::debug!(
            playlist = %playlist.identifier,
            count = songs.len(),
            "Fetched playlist contents"
        );
        Ok(PlaylistData::new(playlist.clone(), songs))
    }

    async fn add_to_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> error::Result<bool> {
        let result = self.add_item(song, playlist).await.map(|_| true).map_err(unavailable);
        log_backend_result!("add_to_playlist", result);
        result
    }

    async fn remove_from_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> error::Result<bool> {
        let result = self.remove_item(song, playlist).await.map(|_| true).map_err(unavailable);
        log_backend_result!("remove_from_playlist", result);
        result
    }
}

/// Build the rspotify client around an already obtained access token
pub async fn setup_rspotify(access_token: Token) -> Result<AuthCodeSpotify> {
    let spotify = AuthCodeSpotify::with_config(
        Default::default(),
        Default::default(),
        rspotify::Config {
            token_cached: false,
            token_refreshing: false,
            ..Default::default()
        },
    );

    *spotify
        .token
        .lock()
        .await
        .map_err(|_| anyhow::anyhow!("Spotify token lock unavailable"))? = Some(access_token);
    tracing::debug!("rspotify client initialized");
    Ok(spotify)
}

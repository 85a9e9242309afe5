//! Core type definitions shared by backends and the player

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::PlayerError;

/// Placeholder title for songs a backend failed to resolve
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Which backend a song, playlist or command belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Local media daemon
    Mpd,
    Tidal,
    #[serde(rename = "yt")]
    YouTube,
    Spotify,
}

impl BackendId {
    pub const ALL: [BackendId; 4] = [
        BackendId::Mpd,
        BackendId::Tidal,
        BackendId::YouTube,
        BackendId::Spotify,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendId::Mpd => "mpd",
            BackendId::Tidal => "tidal",
            BackendId::YouTube => "yt",
            BackendId::Spotify => "spotify",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PlayerError::UnrecognizedSource(s.to_string()))
    }
}

/// Which backend owns playback and whether it is producing audio
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub playing: bool,
    /// `None` until the first `play_song`
    pub play_source: Option<BackendId>,
}

/// Play-state snapshot reported by a backend
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub playing: bool,
    pub elapsed_seconds: f64,
    pub total_seconds: f64,
    /// Backend id of the loaded track, when the backend reports one
    pub identifier: Option<String>,
}

impl SongInfo {
    pub fn remaining_seconds(&self) -> f64 {
        self.total_seconds - self.elapsed_seconds
    }
}

/// Minimal song descriptor common to every backend.
///
/// Two songs are equal when they share `(source, identifier)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongDataShort {
    pub identifier: String,
    pub source: BackendId,
    pub title: String,
    pub artist_string: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Seconds
    pub duration: f64,
}

impl SongDataShort {
    /// Degraded entry rendered when a lookup fails
    pub fn placeholder(identifier: &str, source: BackendId) -> Self {
        Self {
            identifier: identifier.to_string(),
            source,
            title: UNKNOWN_TITLE.to_string(),
            artist_string: String::new(),
            artists: Vec::new(),
            album: String::new(),
            duration: 0.0,
        }
    }

    pub fn key(&self) -> (BackendId, &str) {
        (self.source, &self.identifier)
    }
}

impl PartialEq for SongDataShort {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SongDataShort {}

/// Playlist as listed by a backend (sidebar entry)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaylistDataShort {
    pub identifier: String,
    pub source: BackendId,
    pub title: String,
    pub owner: String,
    pub track_count: u32,
}

impl PlaylistDataShort {
    pub fn key(&self) -> PlaylistKey {
        (self.source, self.identifier.clone())
    }
}

impl PartialEq for PlaylistDataShort {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.identifier == other.identifier
    }
}

impl Eq for PlaylistDataShort {}

/// Cache key of a playlist
pub type PlaylistKey = (BackendId, String);

/// Full contents of a playlist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaylistData {
    pub playlist: PlaylistDataShort,
    pub songs: Vec<SongDataShort>,
    /// Set when the playlist cache stores this value
    #[serde(skip)]
    pub gathered_at: Option<Instant>,
}

impl PlaylistData {
    pub fn new(playlist: PlaylistDataShort, songs: Vec<SongDataShort>) -> Self {
        Self {
            playlist,
            songs,
            gathered_at: None,
        }
    }

    /// Value returned when the backend could not provide the contents
    pub fn empty(playlist: &PlaylistDataShort) -> Self {
        Self::new(playlist.clone(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// One entry of the externally owned play queue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub identifier: String,
    pub source: BackendId,
}

impl QueueEntry {
    pub fn new(identifier: impl Into<String>, source: BackendId) -> Self {
        Self {
            identifier: identifier.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_back() {
        for id in BackendId::ALL {
            assert_eq!(id.to_string().parse::<BackendId>().unwrap(), id);
        }
        assert!(matches!(
            "winamp".parse::<BackendId>(),
            Err(PlayerError::UnrecognizedSource(name)) if name == "winamp"
        ));
    }

    #[test]
    fn backend_serializes_with_short_names() {
        let json = serde_json::to_string(&BackendId::YouTube).unwrap();
        assert_eq!(json, "\"yt\"");
        let parsed: BackendId = serde_json::from_str("\"mpd\"").unwrap();
        assert_eq!(parsed, BackendId::Mpd);
    }

    #[test]
    fn song_identity_ignores_metadata() {
        let a = SongDataShort::placeholder("42", BackendId::Tidal);
        let mut b = a.clone();
        b.title = "Something else".to_string();
        b.duration = 180.0;
        assert_eq!(a, b);

        let c = SongDataShort::placeholder("42", BackendId::Spotify);
        assert_ne!(a, c);
    }

    #[test]
    fn placeholder_is_zeroed() {
        let song = SongDataShort::placeholder("abc", BackendId::Mpd);
        assert_eq!(song.title, UNKNOWN_TITLE);
        assert!(song.artists.is_empty());
        assert_eq!(song.duration, 0.0);
        assert_eq!(song.key(), (BackendId::Mpd, "abc"));
    }
}

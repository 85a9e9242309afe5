//! Player configuration persisted as JSON

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const CONFIG_FILE: &str = ".config/unified-player.json";

pub const DEFAULT_VOLUME_PERCENT: u8 = 50;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Target volume applied before every `play_song`
    pub volume: u8,
    /// How often the binary polls the active backend
    pub poll_interval_ms: u64,
    pub playlist_ttl_secs: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME_PERCENT,
            poll_interval_ms: 500,
            playlist_ttl_secs: 120,
        }
    }
}

impl PlayerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    pub fn playlist_ttl(&self) -> Duration {
        Duration::from_secs(self.playlist_ttl_secs)
    }
}

/// Configuration shared between the player and whoever edits it
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<PlayerConfig>>,
    path: PathBuf,
}

impl SharedConfig {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            PlayerConfig::default()
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
            path: path.to_path_buf(),
        })
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let content = serde_json::to_string_pretty(&*self.inner.read().await)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub async fn get(&self) -> PlayerConfig {
        self.inner.read().await.clone()
    }

    pub async fn volume(&self) -> u8 {
        self.inner.read().await.volume
    }

    pub async fn set_volume(&self, volume: u8) {
        self.inner.write().await.volume = volume.min(100);
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{ "volume": 80 }"#).unwrap();
        assert_eq!(config.volume, 80);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.playlist_ttl(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "unified-player-config-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let config = SharedConfig::load_from(&path).unwrap();
        assert_eq!(config.volume().await, DEFAULT_VOLUME_PERCENT);

        config.set_volume(250).await;
        assert_eq!(config.volume().await, 100);
        config.save_to_disk().await.unwrap();

        let reloaded = SharedConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.volume().await, 100);
        let _ = std::fs::remove_file(&path);
    }
}

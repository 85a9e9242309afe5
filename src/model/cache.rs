//! Cache for playlist contents so repeated views skip the backend

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

use super::types::{PlaylistData, PlaylistKey};

/// How long fetched playlist contents stay fresh
pub const PLAYLIST_TTL: Duration = Duration::from_secs(120);

/// Playlist contents keyed by `(source, identifier)` with a time-to-live
#[derive(Clone)]
pub struct PlaylistCache {
    entries: Arc<RwLock<HashMap<PlaylistKey, PlaylistData>>>,
    fetch_locks: Arc<Mutex<HashMap<PlaylistKey, Arc<Mutex<()>>>>>,
    ttl: Duration,
}

impl PlaylistCache {
    pub fn new() -> Self {
        Self::with_ttl(PLAYLIST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            fetch_locks: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Cached contents if gathered less than `ttl` ago
    pub async fn get_fresh(&self, key: &PlaylistKey) -> Option<PlaylistData> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|data| {
                data.gathered_at
                    .is_some_and(|gathered| gathered.elapsed() < self.ttl)
            })
            .cloned()
    }

    /// Stamp `data` with the current time and store it, replacing any
    /// previous entry for the same playlist.
    pub async fn insert(&self, mut data: PlaylistData) -> PlaylistData {
        data.gathered_at = Some(Instant::now());
        let key = data.playlist.key();
        self.entries.write().await.insert(key, data.clone());
        data
    }

    pub async fn evict(&self, key: &PlaylistKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Serializes fetches of one playlist so concurrent requests for the
    /// same key hit the backend once. Hand the guard back to
    /// `release_fetch` when done.
    pub async fn lock_fetch(&self, key: &PlaylistKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.fetch_locks.lock().await;
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Unlock a fetch and forget its lock once nobody else is waiting on it
    pub async fn release_fetch(&self, key: &PlaylistKey, guard: OwnedMutexGuard<()>) {
        let mut locks = self.fetch_locks.lock().await;
        drop(guard);
        // Waiters hold their own clone, taken under the map lock
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub async fn contains(&self, key: &PlaylistKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub async fn fetch_lock_count(&self) -> usize {
        self.fetch_locks.lock().await.len()
    }
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self::new()
    }
}

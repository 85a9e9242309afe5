//! Playlist contents, listings and edits

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Mutex;

use crate::logging::log_failure;
use crate::model::{BackendId, PlayerEvent, PlaylistData, PlaylistDataShort, SongDataShort};

use super::Player;

#[derive(Default)]
struct ListingState {
    fetched: BTreeSet<BackendId>,
    listings: BTreeMap<BackendId, Vec<PlaylistDataShort>>,
}

/// Per-backend playlist listings. Each backend is asked once unless its
/// listing is invalidated.
#[derive(Clone, Default)]
pub struct PlaylistListings {
    inner: Arc<Mutex<ListingState>>,
}

impl PlaylistListings {
    pub async fn is_fetched(&self, source: BackendId) -> bool {
        self.inner.lock().await.fetched.contains(&source)
    }

    /// Store a backend's listing and return the new aggregate
    pub async fn store(
        &self,
        source: BackendId,
        listing: Vec<PlaylistDataShort>,
    ) -> Vec<PlaylistDataShort> {
        let mut inner = self.inner.lock().await;
        inner.listings.insert(source, listing);
        inner.fetched.insert(source);
        Self::concat(&inner)
    }

    /// All listings concatenated in `BackendId` order
    pub async fn aggregate(&self) -> Vec<PlaylistDataShort> {
        Self::concat(&*self.inner.lock().await)
    }

    /// Forget that `source` (or every backend) was fetched. The listing
    /// stays visible until the refetch replaces it.
    pub async fn invalidate(&self, source: Option<BackendId>) {
        let mut inner = self.inner.lock().await;
        match source {
            Some(source) => {
                inner.fetched.remove(&source);
            }
            None => inner.fetched.clear(),
        }
    }

    fn concat(inner: &ListingState) -> Vec<PlaylistDataShort> {
        inner.listings.values().flatten().cloned().collect()
    }
}

impl Player {
    /// Contents of `playlist`, from cache while fresh.
    ///
    /// Returns an empty playlist when the backend fails; failures are not
    /// cached.
    pub async fn get_playlist_data(&self, playlist: &PlaylistDataShort) -> PlaylistData {
        let key = playlist.key();
        if let Some(cached) = self.playlist_cache.get_fresh(&key).await {
            tracing::trace!(
                source = %playlist.source,
                playlist = %playlist.identifier,
                "Playlist cache hit"
            );
            return cached;
        }

        let fetching = self.playlist_cache.lock_fetch(&key).await;
        // Someone else may have fetched it while we waited
        let data = match self.playlist_cache.get_fresh(&key).await {
            Some(cached) => cached,
            None => self.fetch_playlist_data(playlist).await,
        };
        self.playlist_cache.release_fetch(&key, fetching).await;
        data
    }

    async fn fetch_playlist_data(&self, playlist: &PlaylistDataShort) -> PlaylistData {
        let result =
            async { self.backends.get(playlist.source)?.get_playlist_data(playlist).await }.await;

        match result {
            Ok(mut data) => {
                if data.playlist != *playlist {
                    data.playlist = playlist.clone();
                }
                tracing::debug!(
                    source = %playlist.source,
                    playlist = %playlist.identifier,
                    songs = data.songs.len(),
                    "Playlist fetched"
                );
                self.playlist_cache.insert(data).await
            }
            Err(e) => {
                log_failure("get_playlist_data", &e);
                PlaylistData::empty(playlist)
            }
        }
    }

    /// Drop the cached contents of `playlist`
    pub async fn uncache_playlist(&self, playlist: &PlaylistDataShort) -> bool {
        let evicted = self.playlist_cache.evict(&playlist.key()).await;
        if evicted {
            tracing::debug!(
                source = %playlist.source,
                playlist = %playlist.identifier,
                "Playlist uncached"
            );
        }
        evicted
    }

    /// Collect playlist listings from every playlist-capable backend not
    /// fetched yet.
    ///
    /// The observer gets the current aggregate right away and again after
    /// each backend answers. Returns the final aggregate.
    pub async fn update_playlists(&self) -> Vec<PlaylistDataShort> {
        tracing::info!("Updating playlists");

        let mut pending = FuturesUnordered::new();
        for backend in self.backends.playlist_capable() {
            if self.listings.is_fetched(backend.id()).await {
                continue;
            }
            pending.push(async move { (backend.id(), backend.get_playlists().await) });
        }

        self.notify(PlayerEvent::PlaylistsChanged(self.listings.aggregate().await));

        while let Some((source, result)) = pending.next().await {
            match result {
                Ok(listing) => {
                    tracing::info!(source = %source, count = listing.len(), "Playlists loaded");
                    let all = self.listings.store(source, listing).await;
                    self.notify(PlayerEvent::PlaylistsChanged(all));
                }
                Err(e) => log_failure("get_playlists", &e),
            }
        }

        self.listings.aggregate().await
    }

    /// Make the next `update_playlists` ask `source` (or every backend) again
    pub async fn invalidate_playlists(&self, source: Option<BackendId>) {
        self.listings.invalidate(source).await;
    }

    pub async fn add_to_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> bool {
        self.edit_playlist(song, playlist, true).await
    }

    pub async fn remove_from_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
    ) -> bool {
        self.edit_playlist(song, playlist, false).await
    }

    async fn edit_playlist(
        &self,
        song: &SongDataShort,
        playlist: &PlaylistDataShort,
        add: bool,
    ) -> bool {
        let operation = if add { "add_to_playlist" } else { "remove_from_playlist" };

        // A playlist only holds songs of its own backend
        if song.source != playlist.source {
            tracing::warn!(
                operation,
                song_source = %song.source,
                playlist_source = %playlist.source,
                "Rejected cross-source playlist edit"
            );
            return false;
        }

        let result = async {
            let backend = self.backends.get(playlist.source)?;
            if add {
                backend.add_to_playlist(song, playlist).await
            } else {
                backend.remove_from_playlist(song, playlist).await
            }
        }
        .await;

        match result {
            Ok(true) => {
                self.uncache_playlist(playlist).await;
                true
            }
            Ok(false) => false,
            Err(e) => {
                log_failure(operation, &e);
                false
            }
        }
    }
}

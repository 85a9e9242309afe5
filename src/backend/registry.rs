//! Lookup from `BackendId` to the adapter that serves it

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PlayerError, Result};
use crate::model::BackendId;

use super::Backend;

/// Set of registered backends. Cheap to clone; fixed once built.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: Arc<BTreeMap<BackendId, Arc<dyn Backend>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `backend` under its own id, replacing an earlier registration
    pub fn register(mut self, backend: Arc<dyn Backend>) -> Self {
        let id = backend.id();
        tracing::debug!(source = %id, "Registering backend");
        Arc::make_mut(&mut self.backends).insert(id, backend);
        self
    }

    pub fn get(&self, id: BackendId) -> Result<Arc<dyn Backend>> {
        self.backends
            .get(&id)
            .cloned()
            .ok_or_else(|| PlayerError::UnrecognizedSource(id.to_string()))
    }

    pub fn contains(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<BackendId> {
        self.backends.keys().copied().collect()
    }

    /// Backends exposing the playlist capability, in `BackendId` order
    pub fn playlist_capable(&self) -> Vec<Arc<dyn Backend>> {
        self.backends
            .values()
            .filter(|backend| backend.supports_playlists())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    #[test]
    fn lookup_by_id() {
        let registry = BackendRegistry::new()
            .register(Arc::new(MockBackend::new(BackendId::Tidal)))
            .register(Arc::new(MockBackend::new(BackendId::Mpd).without_playlists()));

        assert_eq!(registry.ids(), vec![BackendId::Mpd, BackendId::Tidal]);
        assert_eq!(registry.get(BackendId::Tidal).unwrap().id(), BackendId::Tidal);
        assert!(matches!(
            registry.get(BackendId::Spotify),
            Err(PlayerError::UnrecognizedSource(name)) if name == "spotify"
        ));

        let capable: Vec<_> = registry.playlist_capable().iter().map(|b| b.id()).collect();
        assert_eq!(capable, vec![BackendId::Tidal]);
    }

    #[test]
    fn clones_keep_their_own_registrations() {
        let base = BackendRegistry::new().register(Arc::new(MockBackend::new(BackendId::Tidal)));
        let extended = base
            .clone()
            .register(Arc::new(MockBackend::new(BackendId::YouTube)));

        assert!(!base.contains(BackendId::YouTube));
        assert!(extended.contains(BackendId::YouTube));
    }
}

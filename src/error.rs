//! Error types for backend dispatch and orchestration

use std::fmt::Display;

use thiserror::Error;

use crate::model::BackendId;

/// Failures a backend adapter or the orchestrator can report.
///
/// The `Player` facade converts every one of these into a default value
/// (`false`, an empty listing, a placeholder song). Only `get_current_song`
/// hands them back to the caller.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Network or transport failure inside a backend adapter
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendId, reason: String },

    /// Identifier could not be resolved by the backend
    #[error("{backend} could not resolve '{identifier}'")]
    NotFound { backend: BackendId, identifier: String },

    /// Capability not implemented by the backend
    #[error("{backend} does not support {operation}")]
    Unsupported {
        backend: BackendId,
        operation: &'static str,
    },

    /// Command issued while no backend owns playback
    #[error("No active playback source")]
    NoActiveSource,

    /// Unknown backend name, or a backend that was never registered
    #[error("Unrecognized playback source: {0}")]
    UnrecognizedSource(String),
}

impl PlayerError {
    pub fn unavailable(backend: BackendId, reason: impl Display) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }

    pub fn not_found(backend: BackendId, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            backend,
            identifier: identifier.into(),
        }
    }

    pub fn unsupported(backend: BackendId, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }

    /// True for failures that mean "this backend can't do that" rather than
    /// "something went wrong"; those are logged at debug level only.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type for backend and orchestrator operations
pub type Result<T> = std::result::Result<T, PlayerError>;

//! Unified music player core
//!
//! One `Player` fronts several playback backends (MPD, Tidal, YouTube,
//! Spotify) and makes them behave like a single player: a shared queue,
//! automatic transitions between tracks of different backends and one
//! aggregated playlist view.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod player;

pub use backend::{Backend, BackendRegistry};
pub use config::{PlayerConfig, SharedConfig};
pub use error::{PlayerError, Result};
pub use player::Player;

//! Model module - Shared data types
//!
//! - `types`: backend ids, player state, song and playlist shapes
//! - `events`: outbound notifications for the UI
//! - `queue`: the externally owned play queue
//! - `cache`: playlist contents cache with time-to-live

mod types;
mod events;
mod queue;
mod cache;

pub use types::{
    BackendId, PlayerState, SongInfo, SongDataShort, PlaylistDataShort,
    PlaylistData, PlaylistKey, QueueEntry, UNKNOWN_TITLE,
};

pub use events::{event_channel, EventReceiver, EventSender, PlayerEvent};

pub use queue::{MemoryQueue, PlayQueue};

pub use cache::{PlaylistCache, PLAYLIST_TTL};

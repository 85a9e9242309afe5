//! File-based logging for the unified player
//!
//! Everything goes to a rolling file under `.logs/` so whatever UI drives
//! the player keeps the terminal to itself. Adapters trace raw backend calls
//! with `log_backend_result!` at debug level; the player reports each
//! swallowed error with [`log_failure`].

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::PlayerError;

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "unified-player";
const LOG_FILE_SUFFIX: &str = "log";
/// Daily files kept before the oldest is deleted
const MAX_LOG_FILES: usize = 7;
const DEFAULT_FILTER: &str = "unified_player=debug,rspotify=info,warn";

/// Install the global subscriber.
///
/// Writes `.logs/unified-player.YYYY-MM-DD.log`, one file per day, keeping
/// the last week. `RUST_LOG` overrides the default filter
/// (`unified_player=debug,rspotify=info,warn`).
///
/// The returned guard flushes pending lines when dropped; hold it until the
/// process exits.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(LOG_DIR)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(LOG_DIR)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init()?;

    tracing::info!(dir = LOG_DIR, "Logging initialized");
    Ok(guard)
}

/// Report a backend failure the player turned into a default value.
///
/// Missing capabilities are expected and stay at debug level.
pub fn log_failure(operation: &'static str, error: &PlayerError) {
    if error.is_unsupported() {
        tracing::debug!(operation, error = %error, "Operation not supported");
    } else {
        tracing::warn!(operation, error = %error, "Backend operation failed");
    }
}

/// Trace the outcome of a raw backend call at debug level. The player logs
/// failures again through `log_failure`.
#[macro_export]
macro_rules! log_backend_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Backend request successful"),
            Err(e) => tracing::debug!(operation = $operation, error = %e, "Backend request failed"),
        }
    };
}

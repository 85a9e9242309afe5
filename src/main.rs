use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rspotify::clients::OAuthClient;

use unified_player::auth;
use unified_player::backend::{setup_rspotify, BackendRegistry, SpotifyBackend};
use unified_player::config::SharedConfig;
use unified_player::logging;
use unified_player::model::{
    event_channel, BackendId, EventReceiver, MemoryQueue, PlayerEvent, QueueEntry,
};
use unified_player::Player;

const DEVICE_NAME: &str = "unified-player";
const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Unified Player Starting ===");

    let config = SharedConfig::load()?;
    let settings = config.get().await;

    let auth_result = auth::perform_oauth_flow().await?;
    let rspotify_client = setup_rspotify(auth_result.rspotify_token.clone()).await?;

    match rspotify_client.me().await {
        Ok(user) => tracing::info!(user_id = %user.id, "rspotify authorized successfully"),
        Err(e) => {
            tracing::error!(error = %e, "rspotify authentication failed");
            return Err(anyhow::anyhow!("rspotify init failed"));
        }
    }

    let spotify = SpotifyBackend::new(
        rspotify_client,
        Some(DEVICE_NAME.to_string()),
        auth_result.refresh_token.clone(),
        auth_result.rspotify_token.expires_at,
    );

    let registry = BackendRegistry::new().register(Arc::new(spotify.clone()));
    let queue = MemoryQueue::new(queue_from_args(std::env::args().skip(1))?);
    let (events_tx, events) = event_channel();

    let player = Player::new(registry, Arc::new(queue.clone()), config.clone(), events_tx)
        .with_playlist_ttl(settings.playlist_ttl());

    tokio::spawn(log_events(events));

    player.update_playlists().await;

    if let Some(first) = queue.current().await {
        if !player.play_song(&first.identifier, first.source).await {
            tracing::warn!(identifier = %first.identifier, "Could not start first queue entry");
        }
    } else {
        tracing::info!("Queue is empty, waiting for playback started elsewhere");
    }

    run(&player, &spotify, settings.poll_interval()).await;

    if let Err(e) = config.save_to_disk().await {
        tracing::warn!(error = %e, "Could not save config");
    }

    tracing::info!("Unified Player shutting down");
    Ok(())
}

/// Queue entries from `source:identifier` arguments. A bare identifier is
/// taken as a Spotify track.
fn queue_from_args(args: impl Iterator<Item = String>) -> Result<Vec<QueueEntry>> {
    args.map(|arg| match arg.split_once(':') {
        Some((source, identifier)) => Ok(QueueEntry::new(identifier, source.parse::<BackendId>()?)),
        None => Ok(QueueEntry::new(arg, BackendId::Spotify)),
    })
    .collect()
}

async fn log_events(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            PlayerEvent::CurrentSongChanged(info) => tracing::info!(
                identifier = info.identifier.as_deref().unwrap_or("-"),
                total = info.total_seconds,
                "Now playing"
            ),
            PlayerEvent::PlaylistsChanged(playlists) => {
                tracing::info!(count = playlists.len(), "Playlists changed")
            }
        }
    }
}

/// Poll the active backend until Ctrl-C, refreshing the Spotify token once
/// a minute.
async fn run(player: &Player, spotify: &SpotifyBackend, poll_interval: Duration) {
    let mut poll = tokio::time::interval(poll_interval);
    let mut token_check = tokio::time::interval(TOKEN_CHECK_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(e) = player.get_current_song().await {
                    tracing::trace!(error = %e, "Poll skipped");
                }
            }
            _ = token_check.tick() => {
                let spotify = spotify.clone();
                tokio::spawn(async move {
                    if let Err(e) = spotify.refresh_token_if_needed().await {
                        tracing::warn!("Token refresh check failed: {}", e);
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }
}

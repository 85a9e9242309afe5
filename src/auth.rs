use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use librespot_oauth::{OAuthClient, OAuthClientBuilder};
use rspotify::Token;

const SPOTIFY_CLIENT_ID: &str = "492e1e45ea814fa3ac555fe1576aaf5b";
const SPOTIFY_REDIRECT_URI: &str = "http://127.0.0.1:8898/login";
pub const SCOPES: &str = concat!(
    "user-read-playback-state user-modify-playback-state user-read-currently-playing ",
    "playlist-read-private playlist-read-collaborative ",
    "playlist-modify-private playlist-modify-public",
);

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>Success</title></head>
<body><h1>Authentication Successful!</h1><script>window.close();</script></body>
</html>
"#;
const CACHE: &str = ".cache";
const REFRESH_TOKEN_FILE: &str = ".cache/refresh_token";
const ACCESS_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens needed to drive the Spotify backend
#[derive(Clone)]
pub struct AuthResult {
    pub rspotify_token: Token,
    pub refresh_token: String,
}

fn oauth_client(open_browser: bool) -> Result<OAuthClient> {
    let builder = OAuthClientBuilder::new(
        SPOTIFY_CLIENT_ID,
        SPOTIFY_REDIRECT_URI,
        SCOPES.split_whitespace().collect(),
    );
    let builder = if open_browser {
        builder.open_in_browser().with_custom_message(RESPONSE)
    } else {
        builder
    };
    Ok(builder.build()?)
}

fn store_refresh_token(refresh_token: &str) {
    if !Path::new(CACHE).exists() {
        let _ = fs::create_dir_all(CACHE);
    }
    match fs::write(REFRESH_TOKEN_FILE, refresh_token) {
        Ok(()) => tracing::debug!("Saved refresh token to disk"),
        Err(e) => tracing::warn!(error = %e, "Could not save refresh token"),
    }
}

fn rspotify_token(access_token: String) -> Token {
    Token {
        access_token,
        expires_in: chrono::Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS),
        expires_at: Some(Utc::now() + chrono::Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS)),
        scopes: SCOPES
            .split_whitespace()
            .map(|s| s.to_string())
            .collect::<HashSet<String>>(),
        refresh_token: None,
    }
}

async fn perform_browser_auth() -> Result<AuthResult> {
    tracing::info!("Starting browser-based OAuth flow");
    let token = oauth_client(true)?.get_access_token_async().await?;

    store_refresh_token(&token.refresh_token);
    tracing::info!("Browser authentication completed successfully");

    Ok(AuthResult {
        rspotify_token: rspotify_token(token.access_token),
        refresh_token: token.refresh_token,
    })
}

/// Exchange a refresh token for a fresh access token.
///
/// Returns the new token and the refresh token to use next time.
pub async fn refresh_access_token(refresh_token: &str) -> Result<(Token, String)> {
    let token = oauth_client(false)?
        .refresh_token_async(refresh_token)
        .await?;
    store_refresh_token(&token.refresh_token);
    Ok((rspotify_token(token.access_token), token.refresh_token))
}

pub async fn perform_oauth_flow() -> Result<AuthResult> {
    let Ok(stored_refresh_token) = fs::read_to_string(REFRESH_TOKEN_FILE) else {
        tracing::info!("No cached refresh token found, starting browser authentication");
        return perform_browser_auth().await;
    };

    tracing::info!("Found cached refresh token");
    match refresh_access_token(stored_refresh_token.trim()).await {
        Ok((rspotify_token, refresh_token)) => {
            tracing::debug!("Token refreshed successfully");
            Ok(AuthResult {
                rspotify_token,
                refresh_token,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cached refresh token failed, re-authenticating");
            perform_browser_auth().await
        }
    }
}

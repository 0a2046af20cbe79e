//! Access tokens for the Sheets API, minted from a stored refresh token.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use nachbarn_core::config::GoogleConfig;

/// Refresh this long before Google says the token expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

pub struct TokenSource {
    http: reqwest::Client,
    token_uri: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(http: reqwest::Client, google: &GoogleConfig) -> Self {
        TokenSource {
            http,
            token_uri: google.token_uri.clone(),
            client_id: google.client_id.clone(),
            client_secret: google.client_secret.clone(),
            refresh_token: google.refresh_token.clone(),
            cached: Mutex::new(None),
        }
    }

    /// A valid access token, refreshing it first if needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.access_token.clone());
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    async fn refresh(&self) -> Result<CachedToken> {
        debug!("Refreshing Google access token");

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to refresh Google token ({}): {}", status, error_text);
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        Ok(CachedToken {
            access_token: refreshed.access_token,
            expires_at: Utc::now() + Duration::seconds(refreshed.expires_in),
        })
    }
}

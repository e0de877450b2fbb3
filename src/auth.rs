use base64::engine::{general_purpose, Engine};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ProviderError;

// Refresh this long before the provider-declared expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Zoom Server-to-Server OAuth (account credentials grant).
pub struct ZoomAuth {
    client: Client,
    oauth_base_url: String,
    account_id: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ZoomAuth {
    pub fn new(
        client: Client,
        oauth_base_url: &str,
        account_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            client,
            oauth_base_url: oauth_base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Value for the `Authorization` header of the token request.
    pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
        let raw = format!("{}:{}", client_id, client_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(raw.as_bytes()))
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth/token?grant_type=account_credentials&account_id={}",
            self.oauth_base_url, self.account_id
        )
    }

    /// Return a bearer token, fetching a new one when the cached token is
    /// missing or about to expire.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached Zoom access token expired");
        }

        let response = self.fetch_token().await?;
        let lifetime = (response.expires_in - EXPIRY_MARGIN_SECS).max(0);
        let token = CachedToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            debug!("Discarded cached Zoom access token");
        }
    }

    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        info!("Requesting Zoom access token");

        let res = self
            .client
            .post(self.token_url())
            .header(
                "Authorization",
                Self::basic_credentials(&self.client_id, &self.client_secret),
            )
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token = res
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::Auth(format!("unreadable token response: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(ProviderError::Auth("empty access token".to_string()));
        }

        debug!(
            "Received {} token valid for {} seconds",
            token.token_type, token.expires_in
        );
        Ok(token)
    }
}

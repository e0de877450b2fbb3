//! Process configuration.
//!
//! Values come from the environment; a `.env` file in the working directory
//! is loaded first when present. The three Zoom credentials are required and
//! their absence fails startup.

use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;
use uuid::Uuid;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us/v2";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://zoom.us";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomConfig {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub zoom: ZoomConfig,
    pub bind_address: SocketAddr,
    /// Pinned namespace for local meeting ids. `None` means a fresh namespace
    /// per process, so ids change across restarts.
    pub id_namespace: Option<Uuid>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are treated as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        let zoom = ZoomConfig {
            account_id: require("ZOOM_ACCOUNT_ID")?,
            client_id: require("ZOOM_CLIENT_ID")?,
            client_secret: require("ZOOM_CLIENT_SECRET")?,
            api_base_url: get("ZOOM_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            oauth_base_url: get("ZOOM_OAUTH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH_BASE_URL.to_string()),
            user_id: get("ZOOM_USER_ID").unwrap_or_else(|| "me".to_string()),
        };

        let bind_address = get("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDRESS",
                reason: e.to_string(),
            })?;

        let id_namespace = get("MEETING_ID_NAMESPACE")
            .map(|raw| Uuid::parse_str(raw.trim()))
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                name: "MEETING_ID_NAMESPACE",
                reason: e.to_string(),
            })?;

        Ok(Self {
            zoom,
            bind_address,
            id_namespace,
        })
    }
}

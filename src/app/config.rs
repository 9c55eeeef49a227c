use std::{net::SocketAddr, path::PathBuf, time::Duration};

use axum::http::StatusCode;

use crate::minting;

use super::{envy::Envy, models::api_error::ApiError};

pub const APP_NAME: &str = "Peppermint";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_DB_PATH: &str = "receipts.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_RATE_LIMIT_PER_SEC: u64 = 50;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60 * 60;

/// Settings shared by every subcommand. Built from the environment first,
/// then overridden by command line flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: String,
    pub db_path: PathBuf,
    pub live_reload: bool,
    pub host: String,
    pub port: u16,
    pub rate_limit_per_sec: u64,
    pub minting_api_url: String,
    pub minting_retry_interval: Duration,
    pub minting_retry_count: usize,
    pub poll_interval: Duration,
    pub node_ids: Vec<u32>,
}

impl Config {
    pub fn from_envy(envy: Envy) -> Self {
        Self {
            app_env: envy.app_env.unwrap_or(DEFAULT_APP_ENV.to_string()),
            db_path: envy.db_path.unwrap_or(PathBuf::from(DEFAULT_DB_PATH)),
            live_reload: envy.live_reload.unwrap_or(false),
            host: envy.host.unwrap_or(DEFAULT_HOST.to_string()),
            port: envy.port.unwrap_or(DEFAULT_PORT),
            rate_limit_per_sec: envy
                .rate_limit_per_sec
                .unwrap_or(DEFAULT_RATE_LIMIT_PER_SEC)
                .max(1),
            minting_api_url: envy
                .minting_api_url
                .unwrap_or(minting::config::API_URL.to_string()),
            minting_retry_interval: Duration::from_millis(
                envy.minting_retry_interval_millis
                    .unwrap_or(minting::config::RETRY_INTERVAL_MILLIS),
            ),
            minting_retry_count: envy
                .minting_retry_count
                .unwrap_or(minting::config::RETRY_COUNT),
            poll_interval: Duration::from_secs(
                envy.poll_interval_secs
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                    .max(1),
            ),
            node_ids: envy.node_ids.unwrap_or_default(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ApiError> {
        match format!("{}:{}", self.host, self.port).parse() {
            Ok(addr) => Ok(addr),
            Err(e) => {
                tracing::error!(%e);
                Err(ApiError {
                    code: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Invalid listen address {}:{}.", self.host, self.port),
                })
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_envy(Envy::default())
    }
}

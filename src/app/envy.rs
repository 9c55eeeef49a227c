use std::path::PathBuf;

use serde::Deserialize;

/// Raw environment, as read by `envy` after the `.env.{APP_ENV}` file is loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envy {
    pub app_env: Option<String>,

    pub db_path: Option<PathBuf>,
    pub live_reload: Option<bool>,

    pub host: Option<String>,
    pub port: Option<u16>,
    pub rate_limit_per_sec: Option<u64>,

    pub minting_api_url: Option<String>,
    pub minting_retry_interval_millis: Option<u64>,
    pub minting_retry_count: Option<usize>,
    pub poll_interval_secs: Option<u64>,
    pub node_ids: Option<Vec<u32>>,
}

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio_retry::{strategy::FixedInterval, RetryIf};

use crate::{
    app::{config::Config, models::api_error::ApiError},
    receipts::models::receipt::Receipt,
};

use super::config::{API_URL, RETRY_COUNT, RETRY_INTERVAL_MILLIS};

/// Client for the alpha minting API. Send failures, 429 and 5xx responses
/// are retried on a fixed interval before the error is returned.
#[derive(Debug, Clone)]
pub struct MintingClient {
    base_url: String,
    client: reqwest::Client,
    retry_interval: Duration,
    retry_count: usize,
}

impl MintingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            retry_interval: Duration::from_millis(RETRY_INTERVAL_MILLIS),
            retry_count: RETRY_COUNT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.minting_api_url)
            .with_retry(config.minting_retry_interval, config.minting_retry_count)
    }

    pub fn with_retry(mut self, retry_interval: Duration, retry_count: usize) -> Self {
        self.retry_interval = retry_interval;
        self.retry_count = retry_count;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn retry_strategy(&self) -> std::iter::Take<FixedInterval> {
        FixedInterval::new(self.retry_interval).take(self.retry_count)
    }

    pub async fn fetch_node_receipts_with_retry(
        &self,
        node_id: u32,
    ) -> Result<Vec<Receipt>, ApiError> {
        RetryIf::spawn(
            self.retry_strategy(),
            || async { self.fetch_node_receipts(node_id).await },
            FetchError::is_transient,
        )
        .await
        .map_err(ApiError::from)
    }

    /// Receipts the API returns for a node. Items that cannot be
    /// understood are skipped; the rest are still usable.
    async fn fetch_node_receipts(&self, node_id: u32) -> Result<Vec<Receipt>, FetchError> {
        let url = format!("{}/node/{}", self.base_url, node_id);
        let result = self.client.get(url).send().await;

        let res = match result {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!("fetch_node_receipts {} (1): {:?}", node_id, e);
                return Err(FetchError::Transient(upstream_error(&format!(
                    "Failed to fetch receipts for node {}.",
                    node_id
                ))));
            }
        };

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("fetch_node_receipts {} (2): {}", node_id, status);
            let e = upstream_error(&format!(
                "Failed to fetch receipts for node {} ({}).",
                node_id, status
            ));
            return Err(if is_transient_status(status) {
                FetchError::Transient(e)
            } else {
                FetchError::Permanent(e)
            });
        }

        match res.json::<Vec<Value>>().await {
            Ok(values) => Ok(values
                .into_iter()
                .filter_map(|value| Receipt::from_value(value).ok())
                .collect()),
            Err(e) => {
                tracing::warn!("fetch_node_receipts {} (3): {:?}", node_id, e);
                Err(FetchError::Permanent(upstream_error(&format!(
                    "Failed to read receipts for node {}.",
                    node_id
                ))))
            }
        }
    }

    pub async fn fetch_receipt_with_retry(&self, hash: &str) -> Result<Option<Receipt>, ApiError> {
        RetryIf::spawn(
            self.retry_strategy(),
            || async { self.fetch_receipt(hash).await },
            FetchError::is_transient,
        )
        .await
        .map_err(ApiError::from)
    }

    /// A receipt the API does not know about is `None`, not an error.
    async fn fetch_receipt(&self, hash: &str) -> Result<Option<Receipt>, FetchError> {
        let url = format!("{}/{}", self.base_url, hash);
        let result = self.client.get(url).send().await;

        let res = match result {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!("fetch_receipt {} (1): {:?}", hash, e);
                return Err(FetchError::Transient(upstream_error(&format!(
                    "Failed to fetch receipt {}.",
                    hash
                ))));
            }
        };

        match res.status() {
            status if status.is_success() => {}
            status if is_transient_status(status) => {
                tracing::warn!("fetch_receipt {} (2): {}", hash, status);
                return Err(FetchError::Transient(upstream_error(&format!(
                    "Failed to fetch receipt {}.",
                    hash
                ))));
            }
            _ => return Ok(None),
        }

        match res.json::<Value>().await {
            Ok(value) => match Receipt::from_value(value) {
                Ok(receipt) => Ok(Some(receipt)),
                Err(_) => Ok(None),
            },
            Err(e) => {
                tracing::warn!("fetch_receipt {} (3): {:?}", hash, e);
                Err(FetchError::Permanent(upstream_error(&format!(
                    "Failed to read receipt {}.",
                    hash
                ))))
            }
        }
    }
}

impl Default for MintingClient {
    fn default() -> Self {
        Self::new(API_URL)
    }
}

/// Only transient failures are attempted again.
#[derive(Debug)]
enum FetchError {
    Transient(ApiError),
    Permanent(ApiError),
}

impl FetchError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Transient(e) | FetchError::Permanent(e) => e,
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn upstream_error(message: &str) -> ApiError {
    ApiError {
        code: StatusCode::BAD_GATEWAY,
        message: message.to_string(),
    }
}

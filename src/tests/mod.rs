//! Shared fixtures for unit tests.

use std::{net::TcpListener, sync::Arc, time::Duration};

use axum::{body::BoxBody, http::Response, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::{
    app::{config::Config, util},
    minting::service::MintingClient,
    AppState,
};


pub fn minting_receipt_json(
    hash: &str,
    node_id: u32,
    start: i64,
    end: i64,
    measured_uptime: u64,
    tft: u64,
) -> Value {
    json!({
        "hash": hash,
        "receipt": {
            "Minting": {
                "node_id": node_id,
                "node_type": "Dedicated",
                "farm_id": 1,
                "farm_name": "freefarm",
                "twin_id": 1000 + node_id,
                "period": { "start": start, "end": end },
                "measured_uptime": measured_uptime,
                "resource_units": { "cru": 8, "mru": 32.0, "sru": 1000.0, "hru": 0.0 },
                "reward": { "musd": tft / 2, "tft": tft },
                "stellar_payout_address": "GBNOTAREALADDRESS",
            }
        }
    })
}

pub fn fixup_receipt_json(
    hash: &str,
    node_id: u32,
    start: i64,
    end: i64,
    minted_receipt: &str,
    correct_receipt: &str,
) -> Value {
    json!({
        "hash": hash,
        "receipt": {
            "Fixup": {
                "node_id": node_id,
                "farm_id": 1,
                "period": { "start": start, "end": end },
                "minted_receipt": minted_receipt,
                "correct_receipt": correct_receipt,
                "minted_reward": { "musd": 0, "tft": 0 },
                "correct_reward": { "musd": 0, "tft": 0 },
            }
        }
    })
}

/// A fresh database in its own directory; keep the `TempDir` alive.
pub async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = util::sqlx::connect(&dir.path().join("receipts.db"))
        .await
        .unwrap();

    (dir, pool)
}

pub fn test_state(pool: SqlitePool, live_reload: bool) -> Arc<AppState> {
    let config = Config {
        live_reload,
        ..Default::default()
    };

    Arc::new(AppState {
        pool,
        config: Arc::new(config),
        boot_id: "boot-1".to_string(),
        rankings: Arc::default(),
    })
}

pub fn test_client(base_url: &str) -> MintingClient {
    MintingClient::new(base_url).with_retry(Duration::ZERO, 2)
}

/// Serves `app` on an ephemeral port and returns its base url.
pub async fn spawn_mock_api(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());

    tokio::spawn(server);

    format!("http://{}", addr)
}

pub async fn body_string(response: Response<BoxBody>) -> String {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

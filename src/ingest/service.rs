use std::{collections::BTreeSet, future::Future};

use futures::{future, stream, StreamExt};
use sqlx::SqlitePool;
use tokio::{
    signal,
    time::{interval, MissedTickBehavior},
};

use crate::{
    app::{
        config::Config,
        models::api_error::ApiError,
        util::{self, sqlx::CONNECTION_POOL_SIZE},
    },
    minting::service::MintingClient,
    periods::models::period::STANDARD_PERIOD_DURATION,
    receipts::{self, models::receipt::Receipt},
};

use super::models::ingest_report::IngestReport;

/// Receipts of one node as returned by a sync.
#[derive(Debug)]
pub struct SyncOutcome {
    pub receipts: Vec<Receipt>,
    pub new: u64,
}

/// Whether everything available for the node is already stored: receipts
/// for a period are published after it ends, so nothing new can appear
/// until one full period after the latest one held.
pub async fn has_node_receipts(node_id: u32, now: i64, pool: &SqlitePool) -> Result<bool, ApiError> {
    match receipts::service::get_stored_timestamp(node_id, pool).await? {
        Some(timestamp) => Ok(now < timestamp + STANDARD_PERIOD_DURATION),
        None => Ok(false),
    }
}

pub async fn sync_node(
    node_id: u32,
    client: &MintingClient,
    pool: &SqlitePool,
) -> Result<SyncOutcome, ApiError> {
    let receipts = client.fetch_node_receipts_with_retry(node_id).await?;
    let new = receipts::service::save_receipts(&receipts, pool).await?;

    if let Some(latest_timestamp) = receipts::service::latest_timestamp(&receipts) {
        receipts::service::save_latest_timestamp(node_id, latest_timestamp, pool).await?;
        tracing::info!(
            "processed {} receipt(s) for node {} ({} new), latest period end {}",
            receipts.len(),
            node_id,
            new,
            latest_timestamp
        );
    } else {
        tracing::info!("no receipts published for node {}", node_id);
    }

    Ok(SyncOutcome { receipts, new })
}

/// Stored receipts when current, otherwise fetched first.
pub async fn get_node_receipts(
    node_id: u32,
    now: i64,
    client: &MintingClient,
    pool: &SqlitePool,
) -> Result<Vec<Receipt>, ApiError> {
    if has_node_receipts(node_id, now, pool).await? {
        return receipts::service::get_node_receipts(node_id, pool).await;
    }

    sync_node(node_id, client, pool).await?;

    receipts::service::get_node_receipts(node_id, pool).await
}

/// A single receipt, fetched and stored when not held yet.
pub async fn get_receipt(
    hash: &str,
    client: &MintingClient,
    pool: &SqlitePool,
) -> Result<Option<Receipt>, ApiError> {
    if let Some(receipt) = receipts::service::find_receipt_by_hash(hash, pool).await? {
        return Ok(Some(receipt));
    }

    let Some(receipt) = client.fetch_receipt_with_retry(hash).await? else {
        return Ok(None);
    };

    receipts::service::save_receipt(&receipt, pool).await?;

    Ok(Some(receipt))
}

/// One polling cycle over the configured nodes and every node already stored.
/// A node that fails is left for the next cycle.
pub async fn poll_once(
    node_ids: &[u32],
    now: i64,
    client: &MintingClient,
    pool: &SqlitePool,
) -> Result<IngestReport, ApiError> {
    let mut nodes: BTreeSet<u32> = node_ids.iter().copied().collect();
    nodes.extend(receipts::service::get_node_ids(pool).await?);

    let mut report = IngestReport {
        nodes_checked: nodes.len(),
        ..Default::default()
    };

    let mut stale = Vec::new();
    for node_id in nodes {
        if has_node_receipts(node_id, now, pool).await? {
            report.nodes_skipped += 1;
        } else {
            stale.push(node_id);
        }
    }

    let results: Vec<(u32, Result<SyncOutcome, ApiError>)> = stream::iter(stale)
        .map(|node_id| async move { (node_id, sync_node(node_id, client, pool).await) })
        .buffer_unordered(CONNECTION_POOL_SIZE as usize)
        .collect()
        .await;

    for (node_id, result) in results {
        match result {
            Ok(outcome) => {
                report.receipts_fetched += outcome.receipts.len();
                report.receipts_new += outcome.new;
            }
            Err(e) => {
                tracing::error!("failed to sync node {}: {}", node_id, e);
                report.nodes_failed += 1;
            }
        }
    }

    Ok(report)
}

/// `poll` subcommand: poll, wait, repeat until interrupted.
pub async fn run(config: Config, once: bool) -> Result<(), ApiError> {
    run_until(config, once, async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            future::pending::<()>().await;
        }
    })
    .await
}

/// Polls until `once` finishes a cycle or `shutdown` resolves. A shutdown
/// during a cycle abandons it; receipts already saved stay saved.
pub async fn run_until<F>(config: Config, once: bool, shutdown: F) -> Result<(), ApiError>
where
    F: Future<Output = ()>,
{
    let pool = util::sqlx::connect(&config.db_path).await?;
    let client = MintingClient::from_config(&config);

    tracing::info!(
        "polling {} every {:?} into {}",
        client.base_url(),
        config.poll_interval,
        config.db_path.display()
    );

    let mut interval = interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("stopping poller");
                return Ok(());
            }
        }

        let now = util::time::current_time_in_secs() as i64;

        tokio::select! {
            result = poll_once(&config.node_ids, now, &client, &pool) => match result {
                Ok(report) => tracing::info!("poll finished: {}", report),
                Err(e) => tracing::error!("poll failed: {}", e),
            },
            _ = &mut shutdown => {
                tracing::info!("stopping poller during a cycle");
                return Ok(());
            }
        }

        if once {
            return Ok(());
        }
    }
}

/// `fetch` subcommand.
pub async fn fetch(config: Config, node_id: u32, force: bool) -> Result<(), ApiError> {
    let pool = util::sqlx::connect(&config.db_path).await?;
    let client = MintingClient::from_config(&config);
    let now = util::time::current_time_in_secs() as i64;

    let receipts = if force {
        sync_node(node_id, &client, &pool).await?;
        receipts::service::get_node_receipts(node_id, &pool).await?
    } else {
        get_node_receipts(node_id, now, &client, &pool).await?
    };

    if let Some(timestamp) = receipts::service::get_stored_timestamp(node_id, &pool).await? {
        println!("Stored timestamp for node {}: {}", node_id, timestamp);
    }
    println!("Found {} stored receipts for node {}", receipts.len(), node_id);

    Ok(())
}

/// `receipt` subcommand.
pub async fn show_receipt(config: Config, hash: &str) -> Result<(), ApiError> {
    let pool = util::sqlx::connect(&config.db_path).await?;
    let client = MintingClient::from_config(&config);

    match get_receipt(hash, &client, &pool).await? {
        Some(receipt) => match serde_json::to_string_pretty(&receipt.receipt_data) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(%e),
        },
        None => println!("Receipt {} not found", hash),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        periods::models::period::Period,
        tests::{fixup_receipt_json, minting_receipt_json, spawn_mock_api, test_client, test_pool},
    };
    use tempfile::TempDir;

    fn node_receipts(node_id: u32) -> Value {
        let first = Period::at_offset(100);
        let second = Period::at_offset(101);

        json!([
            minting_receipt_json(&format!("{}-a", node_id), node_id, first.start, first.end, 1_000, 10),
            minting_receipt_json(&format!("{}-b", node_id), node_id, second.start, second.end, 0, 0),
            minting_receipt_json(&format!("{}-c", node_id), node_id, second.start, second.end, 500, 5),
            fixup_receipt_json(
                &format!("{}-f", node_id),
                node_id,
                second.start,
                second.end,
                &format!("{}-b", node_id),
                &format!("{}-c", node_id),
            ),
        ])
    }

    /// Mock API serving `node_receipts` for every node but 13, which always fails.
    fn mock_api(calls: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/node/:id",
            get(move |Path(id): Path<u32>| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if id == 13 {
                        Err(StatusCode::INTERNAL_SERVER_ERROR)
                    } else {
                        Ok(Json(node_receipts(id)))
                    }
                }
            }),
        )
    }

    fn latest_end() -> i64 {
        Period::at_offset(101).end
    }

    #[tokio::test]
    async fn repeated_polling_does_not_duplicate_receipts() {
        let (_dir, pool) = test_pool().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let client = test_client(&spawn_mock_api(mock_api(calls.clone())).await);

        let first = poll_once(&[42], latest_end(), &client, &pool).await.unwrap();
        assert_eq!(first.receipts_fetched, 4);
        assert_eq!(first.receipts_new, 4);

        // Stale again a period later: fetched again, nothing new stored.
        let later = latest_end() + 2 * STANDARD_PERIOD_DURATION;
        let second = poll_once(&[42], later, &client, &pool).await.unwrap();
        assert_eq!(second.receipts_fetched, 4);
        assert_eq!(second.receipts_new, 0);

        assert_eq!(receipts::service::count_receipts(&pool).await.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fresh_nodes_are_skipped() {
        let (_dir, pool) = test_pool().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let client = test_client(&spawn_mock_api(mock_api(calls.clone())).await);

        poll_once(&[42], latest_end(), &client, &pool).await.unwrap();
        let report = poll_once(&[], latest_end() + 60, &client, &pool).await.unwrap();

        assert_eq!(report.nodes_checked, 1);
        assert_eq!(report.nodes_skipped, 1);
        assert_eq!(report.receipts_fetched, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            receipts::service::get_stored_timestamp(42, &pool).await.unwrap(),
            Some(latest_end())
        );
    }

    #[tokio::test]
    async fn failing_node_does_not_stop_the_cycle() {
        let (_dir, pool) = test_pool().await;
        let client = test_client(&spawn_mock_api(mock_api(Arc::default())).await);

        let report = poll_once(&[13, 42, 7], latest_end(), &client, &pool)
            .await
            .unwrap();

        assert_eq!(report.nodes_checked, 3);
        assert_eq!(report.nodes_failed, 1);
        assert_eq!(report.receipts_new, 8);
        assert_eq!(receipts::service::get_node_ids(&pool).await.unwrap(), vec![7, 42]);
        assert!(!has_node_receipts(13, latest_end(), &pool).await.unwrap());
    }

    #[tokio::test]
    async fn node_receipts_come_from_store_when_fresh() {
        let (_dir, pool) = test_pool().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let client = test_client(&spawn_mock_api(mock_api(calls.clone())).await);

        let fetched = get_node_receipts(42, latest_end(), &client, &pool).await.unwrap();
        let stored = get_node_receipts(42, latest_end() + 1, &client, &pool).await.unwrap();

        assert_eq!(fetched.len(), 4);
        assert_eq!(stored.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_receipt_is_fetched_once() {
        let (_dir, pool) = test_pool().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/:hash",
            get(move |Path(hash): Path<String>| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(minting_receipt_json(&hash, 5, 0, 10, 1, 1))
                }
            }),
        );
        let client = test_client(&spawn_mock_api(app).await);

        let first = get_receipt("xyz", &client, &pool).await.unwrap().unwrap();
        let second = get_receipt("xyz", &client, &pool).await.unwrap().unwrap();

        assert_eq!(first.hash, "xyz");
        assert_eq!(second.node_id, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn poll_config(dir: &TempDir, api_url: String) -> Config {
        Config {
            db_path: dir.path().join("receipts.db"),
            minting_api_url: api_url,
            minting_retry_interval: Duration::ZERO,
            minting_retry_count: 1,
            poll_interval: Duration::from_secs(3600),
            node_ids: vec![42],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn single_run_stores_receipts_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let api_url = spawn_mock_api(mock_api(Arc::default())).await;
        let config = poll_config(&dir, api_url);
        let db_path = config.db_path.clone();

        tokio::time::timeout(
            Duration::from_secs(10),
            run_until(config, true, future::pending()),
        )
        .await
        .expect("single run did not exit")
        .unwrap();

        let pool = util::sqlx::connect(&db_path).await.unwrap();
        assert_eq!(receipts::service::count_receipts(&pool).await.unwrap(), 4);
        assert_eq!(
            receipts::service::get_stored_timestamp(42, &pool).await.unwrap(),
            Some(latest_end())
        );
    }

    #[tokio::test]
    async fn shutdown_during_a_cycle_stops_the_poller() {
        let dir = tempfile::tempdir().unwrap();
        let app = Router::new().route(
            "/node/:id",
            get(|Path(id): Path<u32>| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(node_receipts(id))
            }),
        );
        let config = poll_config(&dir, spawn_mock_api(app).await);
        let db_path = config.db_path.clone();

        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            run_until(config, false, tokio::time::sleep(Duration::from_millis(300))),
        )
        .await;

        assert!(matches!(stopped, Ok(Ok(()))));

        let pool = util::sqlx::connect(&db_path).await.unwrap();
        assert_eq!(receipts::service::count_receipts(&pool).await.unwrap(), 0);
    }
}

use std::{path::Path, time::Duration};

use axum::http::StatusCode;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::app::models::api_error::ApiError;

pub const CONNECTION_POOL_SIZE: u32 = 5;

// period_end is stored because it identifies the period reliably; the start
// of a period is scaled for nodes created part way through it.
const SCHEMA: [&str; 4] = [
    "
    CREATE TABLE IF NOT EXISTS receipts (
        hash TEXT PRIMARY KEY NOT NULL,
        node_id INTEGER NOT NULL,
        receipt_type TEXT NOT NULL,
        period_start INTEGER NOT NULL,
        period_end INTEGER NOT NULL,
        measured_uptime INTEGER,
        tft_minted INTEGER,
        receipt_data TEXT NOT NULL,
        fetched_at INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS receipts_node_id_idx ON receipts (node_id, period_end)",
    "
    CREATE TABLE IF NOT EXISTS node_timestamps (
        node_id INTEGER PRIMARY KEY NOT NULL,
        latest_timestamp INTEGER NOT NULL,
        checked_at INTEGER NOT NULL
    )
    ",
    "PRAGMA user_version = 1",
];

/// Opens (creating if needed) the receipts database in WAL mode so the web
/// server can read while the poller writes.
pub async fn connect(db_path: &Path) -> Result<SqlitePool, ApiError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool_result = SqlitePoolOptions::new()
        .max_connections(CONNECTION_POOL_SIZE)
        .idle_timeout(Some(Duration::from_secs(60)))
        .connect_with(options)
        .await;

    let pool = match pool_result {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(%e);
            return Err(ApiError {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Failed to open database {}.", db_path.display()),
            });
        }
    };

    migrate(&pool).await?;

    tracing::debug!("connected to {}", db_path.display());

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), ApiError> {
    for statement in SCHEMA {
        if let Err(e) = sqlx::query(statement).execute(pool).await {
            tracing::error!(%e);
            return Err(ApiError {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Failed to initialize database.".to_string(),
            });
        }
    }

    Ok(())
}

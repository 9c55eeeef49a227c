use sqlx::SqlitePool;

use crate::{
    app::{errors::DefaultApiError, models::api_error::ApiError, util::time},
    receipts::errors::ReceiptsApiError,
};

use super::{dtos::get_receipts_filter_dto::GetReceiptsFilterDto, models::receipt::Receipt};

const INSERT_RECEIPT: &str = "
    INSERT INTO receipts (
        hash, node_id, receipt_type, period_start, period_end,
        measured_uptime, tft_minted, receipt_data, fetched_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (hash) DO NOTHING
    ";

/// Stores a receipt unless its hash is already known. Returns whether it was new.
pub async fn save_receipt(receipt: &Receipt, pool: &SqlitePool) -> Result<bool, ApiError> {
    let sqlx_result = sqlx::query(INSERT_RECEIPT)
        .bind(&receipt.hash)
        .bind(receipt.node_id)
        .bind(&receipt.receipt_type)
        .bind(receipt.period_start)
        .bind(receipt.period_end)
        .bind(receipt.measured_uptime)
        .bind(receipt.tft_minted)
        .bind(&receipt.receipt_data)
        .bind(receipt.fetched_at)
        .execute(pool)
        .await;

    match sqlx_result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

/// Stores a batch in one transaction. Returns how many receipts were new.
pub async fn save_receipts(receipts: &[Receipt], pool: &SqlitePool) -> Result<u64, ApiError> {
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::error!(%e);
            return Err(DefaultApiError::InternalServerError.value());
        }
    };

    let mut inserted = 0;

    for receipt in receipts {
        let sqlx_result = sqlx::query(INSERT_RECEIPT)
            .bind(&receipt.hash)
            .bind(receipt.node_id)
            .bind(&receipt.receipt_type)
            .bind(receipt.period_start)
            .bind(receipt.period_end)
            .bind(receipt.measured_uptime)
            .bind(receipt.tft_minted)
            .bind(&receipt.receipt_data)
            .bind(receipt.fetched_at)
            .execute(&mut tx)
            .await;

        match sqlx_result {
            Ok(result) => inserted += result.rows_affected(),
            Err(e) => {
                tracing::error!(%e);
                return Err(DefaultApiError::InternalServerError.value());
            }
        }
    }

    if let Err(e) = tx.commit().await {
        tracing::error!(%e);
        return Err(DefaultApiError::InternalServerError.value());
    }

    Ok(inserted)
}

pub async fn find_receipt_by_hash(
    hash: &str,
    pool: &SqlitePool,
) -> Result<Option<Receipt>, ApiError> {
    let sqlx_result = sqlx::query_as::<_, Receipt>(
        "
        SELECT * FROM receipts
        WHERE hash = ?
        ",
    )
    .bind(hash)
    .fetch_optional(pool)
    .await;

    match sqlx_result {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn get_receipt_by_hash(hash: &str, pool: &SqlitePool) -> Result<Receipt, ApiError> {
    match find_receipt_by_hash(hash, pool).await? {
        Some(receipt) => Ok(receipt),
        None => Err(ReceiptsApiError::ReceiptNotFound.value()),
    }
}

pub async fn get_receipts(
    dto: &GetReceiptsFilterDto,
    pool: &SqlitePool,
) -> Result<Vec<Receipt>, ApiError> {
    let sql = dto.to_sql()?;

    let mut sqlx = sqlx::query_as::<_, Receipt>(&sql);

    if let Some(node_id) = dto.node_id {
        sqlx = sqlx.bind(node_id);
    }
    if let Some(receipt_type) = &dto.receipt_type {
        sqlx = sqlx.bind(receipt_type);
    }
    if let Some((value, hash)) = dto.cursor_params()? {
        sqlx = sqlx.bind(value).bind(hash);
    }

    match sqlx.fetch_all(pool).await {
        Ok(receipts) => Ok(receipts),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn get_node_receipts(node_id: u32, pool: &SqlitePool) -> Result<Vec<Receipt>, ApiError> {
    let sqlx_result = sqlx::query_as::<_, Receipt>(
        "
        SELECT * FROM receipts
        WHERE node_id = ?
        ORDER BY period_end ASC, rowid ASC
        ",
    )
    .bind(node_id)
    .fetch_all(pool)
    .await;

    match sqlx_result {
        Ok(receipts) => Ok(receipts),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn get_all_receipts(pool: &SqlitePool) -> Result<Vec<Receipt>, ApiError> {
    let sqlx_result = sqlx::query_as::<_, Receipt>(
        "
        SELECT * FROM receipts
        ORDER BY node_id ASC, period_end ASC, rowid ASC
        ",
    )
    .fetch_all(pool)
    .await;

    match sqlx_result {
        Ok(receipts) => Ok(receipts),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn get_node_ids(pool: &SqlitePool) -> Result<Vec<u32>, ApiError> {
    let sqlx_result = sqlx::query_as::<_, (u32,)>(
        "
        SELECT DISTINCT node_id FROM receipts
        ORDER BY node_id ASC
        ",
    )
    .fetch_all(pool)
    .await;

    match sqlx_result {
        Ok(rows) => Ok(rows.into_iter().map(|(node_id,)| node_id).collect()),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn count_receipts(pool: &SqlitePool) -> Result<i64, ApiError> {
    count("SELECT COUNT(*) FROM receipts", pool).await
}

pub async fn count_nodes(pool: &SqlitePool) -> Result<i64, ApiError> {
    count("SELECT COUNT(DISTINCT node_id) FROM receipts", pool).await
}

async fn count(sql: &str, pool: &SqlitePool) -> Result<i64, ApiError> {
    match sqlx::query_as::<_, (i64,)>(sql).fetch_one(pool).await {
        Ok((count,)) => Ok(count),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

/// Latest period end among the receipts, if any.
pub fn latest_timestamp(receipts: &[Receipt]) -> Option<i64> {
    receipts
        .iter()
        .map(|receipt| receipt.period_end)
        .filter(|end| *end > 0)
        .max()
}

pub async fn save_latest_timestamp(
    node_id: u32,
    timestamp: i64,
    pool: &SqlitePool,
) -> Result<(), ApiError> {
    let sqlx_result = sqlx::query(
        "
        INSERT INTO node_timestamps (node_id, latest_timestamp, checked_at)
        VALUES (?, ?, ?)
        ON CONFLICT (node_id) DO UPDATE SET
            latest_timestamp = MAX(latest_timestamp, excluded.latest_timestamp),
            checked_at = excluded.checked_at
        ",
    )
    .bind(node_id)
    .bind(timestamp)
    .bind(time::current_time_in_secs() as i64)
    .execute(pool)
    .await;

    match sqlx_result {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

pub async fn get_stored_timestamp(node_id: u32, pool: &SqlitePool) -> Result<Option<i64>, ApiError> {
    let sqlx_result = sqlx::query_as::<_, (i64,)>(
        "
        SELECT latest_timestamp FROM node_timestamps
        WHERE node_id = ?
        ",
    )
    .bind(node_id)
    .fetch_optional(pool)
    .await;

    match sqlx_result {
        Ok(row) => Ok(row.map(|(timestamp,)| timestamp)),
        Err(e) => {
            tracing::error!(%e);
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}

use std::sync::Arc;

use serde_json::{json, Value};

use crate::{receipts, AppState};

use super::{config::APP_NAME, models::api_error::ApiError};

pub async fn get_api_status(state: &Arc<AppState>) -> Result<Value, ApiError> {
    let receipt_count = receipts::service::count_receipts(&state.pool).await?;
    let node_count = receipts::service::count_nodes(&state.pool).await?;

    Ok(json!({
        "app": APP_NAME,
        "app_env": state.config.app_env,
        "live_reload": state.config.live_reload,
        "receipts": receipt_count,
        "nodes": node_count,
    }))
}

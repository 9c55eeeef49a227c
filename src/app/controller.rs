use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, Json};
use serde_json::Value;

use crate::AppState;

use super::{
    errors::DefaultApiError,
    models::api_error::ApiError,
    service,
    templates::{self, node_form::node_form_template},
};

pub async fn get_root(State(state): State<Arc<AppState>>) -> Response {
    templates::render(
        &state,
        StatusCode::OK,
        "Fetch Node Minting Receipts",
        &node_form_template(None, None),
    )
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match service::get_api_status(&state).await {
        Ok(status) => Ok(Json(status)),
        Err(e) => Err(e),
    }
}

/// Polled by pages in live reload mode; a different id means the server restarted.
pub async fn get_live_reload(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    if !state.config.live_reload {
        return Err(DefaultApiError::NotFound.value());
    }

    Ok(state.boot_id.to_string())
}

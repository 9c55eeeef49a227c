use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    app::models::{api_error::ApiError, from_request::QueryFromRequest},
    AppState,
};

use super::{dtos::get_receipts_filter_dto::GetReceiptsFilterDto, models::receipt::Receipt, service};

pub async fn get_receipts(
    State(state): State<Arc<AppState>>,
    QueryFromRequest(dto): QueryFromRequest<GetReceiptsFilterDto>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    match dto.validate() {
        Ok(_) => match service::get_receipts(&dto, &state.pool).await {
            Ok(receipts) => Ok(Json(receipts)),
            Err(e) => Err(e),
        },
        Err(e) => Err(ApiError {
            code: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }),
    }
}

pub async fn get_receipt_by_hash(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    match service::get_receipt_by_hash(&hash, &state.pool).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => Err(e),
    }
}

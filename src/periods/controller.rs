use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::{
    app::{
        models::{api_error::ApiError, from_request::PathFromRequest},
        templates::{self, node_form::node_form_template},
    },
    receipts::errors::ReceiptsApiError,
    AppState,
};

use super::{
    dtos::find_node_dto::{parse_node_id, FindNodeDto},
    models::node_minting_period::NodeMintingPeriod,
    service,
    templates::node_periods_template,
};

pub async fn find_node(
    State(state): State<Arc<AppState>>,
    Query(dto): Query<FindNodeDto>,
) -> Response {
    match dto.node_id() {
        Some(node_id) => Redirect::to(&format!("/nodes/{}", node_id)).into_response(),
        None => invalid_node_page(&state, dto.node_id.as_deref()),
    }
}

pub async fn get_node_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(node_id) = parse_node_id(&id) else {
        return invalid_node_page(&state, Some(&id));
    };

    match service::get_node_minting_periods(node_id, &state.pool).await {
        Ok(periods) => templates::render(
            &state,
            StatusCode::OK,
            &format!("Node {}", node_id),
            &node_periods_template(node_id, &periods),
        ),
        Err(e) => e.into_response(),
    }
}

pub async fn get_node_periods(
    State(state): State<Arc<AppState>>,
    PathFromRequest(node_id): PathFromRequest<u32>,
) -> Result<Json<Vec<NodeMintingPeriod>>, ApiError> {
    match service::get_node_minting_periods(node_id, &state.pool).await {
        Ok(periods) => Ok(Json(periods)),
        Err(e) => Err(e),
    }
}

fn invalid_node_page(state: &AppState, value: Option<&str>) -> Response {
    let message = ReceiptsApiError::InvalidNodeId.value().message;

    templates::render(
        state,
        StatusCode::BAD_REQUEST,
        "Fetch Node Minting Receipts",
        &node_form_template(value, Some(&message)),
    )
}

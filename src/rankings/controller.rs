use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::{
    app::{
        models::{api_error::ApiError, from_request::QueryFromRequest},
        templates, util,
    },
    AppState,
};

use super::{
    dtos::get_rankings_dto::GetRankingsDto, models::node_ranking::NodeRanking,
    templates::rankings_template,
};

async fn get_top_rankings(state: &AppState, top: usize) -> Result<Vec<NodeRanking>, ApiError> {
    let now = util::time::current_time_in_secs() as i64;
    state.rankings.top(top, now, &state.pool).await
}

pub async fn get_rankings(
    State(state): State<Arc<AppState>>,
    QueryFromRequest(dto): QueryFromRequest<GetRankingsDto>,
) -> Result<Json<Vec<NodeRanking>>, ApiError> {
    match dto.validate() {
        Ok(_) => match get_top_rankings(&state, dto.top()).await {
            Ok(rankings) => Ok(Json(rankings)),
            Err(e) => Err(e),
        },
        Err(e) => Err(ApiError {
            code: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }),
    }
}

pub async fn get_rankings_page(
    State(state): State<Arc<AppState>>,
    QueryFromRequest(dto): QueryFromRequest<GetRankingsDto>,
) -> Response {
    if let Err(e) = dto.validate() {
        return ApiError {
            code: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
        .into_response();
    }

    match get_top_rankings(&state, dto.top()).await {
        Ok(rankings) => templates::render(
            &state,
            StatusCode::OK,
            &format!("Top {} Nodes by Average Uptime", dto.top()),
            &rankings_template(&rankings),
        ),
        Err(e) => e.into_response(),
    }
}

use std::{sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    BoxError, Router,
};
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{app, periods, rankings, receipts, AppState};

use super::errors::DefaultApiError;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET]);

    let rate_limit_per_sec = state.config.rate_limit_per_sec;

    Router::new()
        .route("/", get(app::controller::get_root))
        .route("/live-reload", get(app::controller::get_live_reload))
        .route("/api/status", get(app::controller::get_status))
        // receipts
        .route("/api/receipts", get(receipts::controller::get_receipts))
        .route(
            "/api/receipts/:hash",
            get(receipts::controller::get_receipt_by_hash),
        )
        // periods
        .route("/nodes", get(periods::controller::find_node))
        .route("/nodes/:id", get(periods::controller::get_node_page))
        .route(
            "/api/nodes/:id/periods",
            get(periods::controller::get_node_periods),
        )
        // rankings
        .route("/rankings", get(rankings::controller::get_rankings_page))
        .route("/api/rankings", get(rankings::controller::get_rankings))
        // layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    tracing::error!(%err);
                    DefaultApiError::InternalServerError.value()
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(
                    rate_limit_per_sec,
                    Duration::from_secs(1),
                )),
        )
        .with_state(state)
}

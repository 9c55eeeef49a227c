use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::AppState;

pub mod layout;
pub mod node_form;

/// Wraps a page body in the shared layout. In live reload mode pages must
/// never be cached, or the reload would show stale content.
pub fn render(state: &AppState, code: StatusCode, title: &str, body: &str) -> Response {
    let html = layout::layout_template(title, body, state.config.live_reload);

    if state.config.live_reload {
        (code, [(header::CACHE_CONTROL, "no-store")], Html(html)).into_response()
    } else {
        (code, Html(html)).into_response()
    }
}

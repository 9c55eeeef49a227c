use std::sync::Arc;

use axum::http::StatusCode;
use tokio::signal;

use crate::AppState;

use super::{
    config::Config, models::api_error::ApiError, router::router, util,
};

pub async fn serve(config: Config) -> Result<(), ApiError> {
    let pool = util::sqlx::connect(&config.db_path).await?;
    let addr = config.socket_addr()?;

    tracing::info!(
        "serving receipts from {} (live reload: {})",
        config.db_path.display(),
        config.live_reload
    );

    let state = AppState {
        pool,
        boot_id: util::time::current_time_in_millis().to_string(),
        config: Arc::new(config),
        rankings: Arc::default(),
    };

    let app = router(Arc::new(state));

    let server = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder.serve(app.into_make_service()),
        Err(e) => {
            tracing::error!(%e);
            return Err(ApiError {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Failed to bind {}.", addr),
            });
        }
    };

    tracing::info!("listening on {}", server.local_addr());

    let result = server
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(%e);
            Err(ApiError {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Server stopped unexpectedly.".to_string(),
            })
        }
    }
}

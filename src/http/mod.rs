use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod error;
pub(crate) mod handlers;
pub(crate) mod request_tracing;

pub use error::ApiError;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/", get(handlers::health_handler))
        .route("/stats/", post(handlers::stats_handler))
        .route("/plots/:plot_id", get(handlers::plot_handler))
        .layer(from_fn(request_tracing::request_tracing_middleware))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}

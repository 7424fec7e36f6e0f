use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

use super::handlers;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/snapshot",
            get(handlers::snapshot).options(handlers::snapshot_options),
        )
        .route("/status", get(handlers::status))
        .route(
            "/settings",
            get(handlers::settings).post(handlers::update_settings),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

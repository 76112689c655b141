//! HTTP surface / HTTP 接口
//!
//! Validation and response shaping live here; the search itself is behind
//! [`crate::search::ProductSearcher`].

pub mod search;
pub mod server;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router / 构建路由
pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(server::health_check))
        .route("/search", post(search::search))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

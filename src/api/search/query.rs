use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::types::*;
use crate::models::{SearchRequest, ValidationError};
use crate::search::SearchOutcome;
use crate::state::AppState;

/// POST /search - 商品搜索
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> (StatusCode, Json<SearchResponse>) {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => {
            tracing::debug!("Rejected search body: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(SearchResponse::message(MSG_INVALID_BODY)));
        }
    };

    let req = match req.validate() {
        Ok(req) => req,
        // A blank search is answered, not refused.
        Err(e @ ValidationError::EmptySearch) => {
            return (StatusCode::OK, Json(SearchResponse::message(e.to_string())));
        }
        Err(e) => {
            tracing::debug!("Rejected search request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(SearchResponse::message(e.to_string())));
        }
    };

    let cancel = state.shutdown.child_token();
    match state.searcher.search(req, cancel).await {
        SearchOutcome::Results(records) => (StatusCode::OK, Json(SearchResponse::results(records))),
        SearchOutcome::Empty => (StatusCode::OK, Json(SearchResponse::message(MSG_NONE_FOUND))),
        // Already logged by the searcher.
        SearchOutcome::Failure(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SearchResponse::message(MSG_INTERNAL_ERROR)),
        ),
    }
}

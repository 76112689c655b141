//! Fake search engine for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves the handful of engine endpoints the crate talks to:
//! - `GET /` - ping
//! - `POST /{index}/_search` - replays a scripted reply, optionally delayed
//! - `HEAD|PUT|DELETE /{index}` - index existence, creation, removal
//! - `POST /{index}/_bulk` - stores NDJSON documents
//! - `POST /{index}/_delete_by_query` - clears stored documents
//!
//! Every request's body and `Authorization` header are recorded so tests can
//! assert on what was sent.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, head, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Scripted reply for `_search`.
#[derive(Debug, Clone)]
pub struct SearchReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl SearchReply {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct EngineState {
    search_reply: Option<SearchReply>,
    search_requests: Vec<Value>,
    auth_headers: Vec<String>,
    index_exists: bool,
    mapping: Option<Value>,
    documents: Vec<Value>,
    ping_status: Option<StatusCode>,
}

type Shared = Arc<Mutex<EngineState>>;

/// Handle to the running fake engine.
pub struct FakeEngine {
    addr: SocketAddr,
    state: Shared,
}

impl FakeEngine {
    /// Start the fake engine on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(EngineState::default()));

        let app = Router::new()
            .route("/", get(ping))
            .route("/:index", head(index_head).put(index_put).delete(index_delete))
            .route("/:index/_search", post(search))
            .route("/:index/_bulk", post(bulk))
            .route("/:index/_delete_by_query", post(delete_by_query))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn reply_to_search(&self, reply: SearchReply) {
        self.state.lock().await.search_reply = Some(reply);
    }

    pub async fn fail_ping(&self, status: StatusCode) {
        self.state.lock().await.ping_status = Some(status);
    }

    pub async fn set_index_exists(&self, exists: bool) {
        self.state.lock().await.index_exists = exists;
    }

    pub async fn search_requests(&self) -> Vec<Value> {
        self.state.lock().await.search_requests.clone()
    }

    pub async fn auth_headers(&self) -> Vec<String> {
        self.state.lock().await.auth_headers.clone()
    }

    pub async fn index_exists(&self) -> bool {
        self.state.lock().await.index_exists
    }

    pub async fn mapping(&self) -> Option<Value> {
        self.state.lock().await.mapping.clone()
    }

    pub async fn documents(&self) -> Vec<Value> {
        self.state.lock().await.documents.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn record_auth(state: &Shared, headers: &HeaderMap) {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.lock().await.auth_headers.push(auth.to_string());
    }
}

async fn ping(State(state): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    record_auth(&state, &headers).await;
    match state.lock().await.ping_status {
        Some(status) => (status, Json(json!({ "error": "unavailable" }))),
        None => (StatusCode::OK, Json(json!({ "version": { "number": "8.12.0" } }))),
    }
}

async fn search(
    State(state): State<Shared>,
    Path(_index): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record_auth(&state, &headers).await;
    let reply = {
        let mut state = state.lock().await;
        state.search_requests.push(body);
        state
            .search_reply
            .clone()
            .unwrap_or_else(|| SearchReply::json(super::search_body(&[])))
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, [("content-type", "application/json")], reply.body)
}

async fn index_head(State(state): State<Shared>) -> StatusCode {
    if state.lock().await.index_exists {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn index_put(State(state): State<Shared>, Json(mapping): Json<Value>) -> impl IntoResponse {
    let mut state = state.lock().await;
    if state.index_exists {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "type": "resource_already_exists_exception" } })),
        );
    }
    state.index_exists = true;
    state.mapping = Some(mapping);
    (StatusCode::OK, Json(json!({ "acknowledged": true })))
}

async fn index_delete(State(state): State<Shared>) -> impl IntoResponse {
    let mut state = state.lock().await;
    if !state.index_exists {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "type": "index_not_found_exception" } })),
        );
    }
    state.index_exists = false;
    state.mapping = None;
    state.documents.clear();
    (StatusCode::OK, Json(json!({ "acknowledged": true })))
}

async fn bulk(State(state): State<Shared>, body: Bytes) -> impl IntoResponse {
    let text = String::from_utf8_lossy(&body);
    let lines: Vec<Value> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();

    // Action and source lines alternate.
    let docs: Vec<Value> = lines.chunks(2).filter_map(|pair| pair.get(1).cloned()).collect();
    let items: Vec<Value> = docs
        .iter()
        .map(|_| json!({ "index": { "status": 201, "result": "created" } }))
        .collect();

    state.lock().await.documents.extend(docs);
    Json(json!({ "took": 1, "errors": false, "items": items }))
}

async fn delete_by_query(State(state): State<Shared>) -> impl IntoResponse {
    let mut state = state.lock().await;
    let deleted = state.documents.len();
    state.documents.clear();
    Json(json!({ "deleted": deleted }))
}

//! Search gateway - build, dispatch, extract / 搜索网关
//!
//! One call walks `Building -> Dispatching -> Extracting` in order. Only the
//! dispatch step awaits, and it races the caller's cancellation token. Every
//! expected failure comes back as [`SearchOutcome::Failure`]; nothing is
//! retried here.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::extract::extract;
use super::outcome::{FailureKind, SearchOutcome};
use super::query::{build_query, FieldBoosts};
use crate::engine::{EngineClient, EngineConfig, EngineError};
use crate::models::SearchRequest;

/// Product search capability, the seam the HTTP handler depends on.
#[async_trait]
pub trait ProductSearcher: Send + Sync {
    /// Run one search. `request` must already be validated.
    async fn search(&self, request: SearchRequest, cancel: CancellationToken) -> SearchOutcome;
}

/// Errors raised once, while constructing the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid field boosts: {0}")]
    InvalidBoosts(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("search engine unreachable at startup: {0}")]
    Unreachable(#[source] EngineError),
}

/// Gateway over a shared engine client.
#[derive(Debug, Clone)]
pub struct SearchGateway {
    client: EngineClient,
    boosts: FieldBoosts,
}

impl SearchGateway {
    /// Build without contacting the engine.
    pub fn new(config: &EngineConfig, boosts: FieldBoosts) -> Result<Self, GatewayError> {
        boosts.validate().map_err(GatewayError::InvalidBoosts)?;
        let client = EngineClient::new(config)?;
        Ok(Self { client, boosts })
    }

    /// Build and, if `verify_on_startup` is set, check the engine answers.
    pub async fn connect(config: &EngineConfig, boosts: FieldBoosts) -> Result<Self, GatewayError> {
        let gateway = Self::new(config, boosts)?;
        if config.verify_on_startup {
            gateway.client.ping().await.map_err(GatewayError::Unreachable)?;
            tracing::info!("Search engine reachable at {}", config.address);
        }
        Ok(gateway)
    }
}

#[async_trait]
impl ProductSearcher for SearchGateway {
    async fn search(&self, request: SearchRequest, cancel: CancellationToken) -> SearchOutcome {
        tracing::debug!(search_for = %request.search_for, "Building engine query");
        let query = build_query(&request, &self.boosts);

        if cancel.is_cancelled() {
            return SearchOutcome::Failure(FailureKind::Cancelled);
        }

        tracing::debug!(index = self.client.index(), "Dispatching search");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Search cancelled while waiting for the engine");
                return SearchOutcome::Failure(FailureKind::Cancelled);
            }
            response = self.client.search(&query) => response,
        };

        let response = match response {
            Ok(body) => body,
            Err(e) => {
                if e.is_timeout() {
                    tracing::warn!("Search engine timed out: {}", e);
                } else {
                    tracing::error!("Search engine request failed: {}", e);
                }
                return SearchOutcome::Failure(FailureKind::TransportError);
            }
        };

        tracing::debug!("Extracting hits");
        // extract() logs its own failures.
        let outcome = extract(&response);
        match &outcome {
            SearchOutcome::Results(records) => {
                tracing::debug!(hits = records.len(), "Search finished")
            }
            SearchOutcome::Empty => tracing::debug!("Search finished with no hits"),
            SearchOutcome::Failure(_) => {}
        }
        outcome
    }
}

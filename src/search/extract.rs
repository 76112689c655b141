//! Result extractor - engine response to product records / 结果提取
//!
//! Reads `hits.hits[*]._source` and decodes every source into a
//! [`ProductRecord`]. One bad hit rejects the whole response; a partially
//! parseable response is not trusted.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::outcome::{FailureKind, SearchOutcome};
use crate::models::ProductRecord;

/// Detailed extraction failure, logged and then collapsed into a [`FailureKind`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response has no '{0}' key")]
    MissingKey(&'static str),

    #[error("'{0}' is not an object")]
    NotAMapping(&'static str),

    #[error("'hits.hits' is not an array")]
    NotASequence,

    #[error("hit {0} has no '_source' object")]
    MalformedHit(usize),

    #[error("hit {index} does not decode into a product: {source}")]
    Decode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::Decode { .. } => FailureKind::DecodeError,
            _ => FailureKind::MalformedResponse,
        }
    }
}

/// Classify an engine response / 解析引擎响应
pub fn extract(response: &Value) -> SearchOutcome {
    match extract_records(response) {
        Ok(records) => SearchOutcome::from_records(records),
        Err(e) => {
            tracing::warn!("Failed to extract hits: {}", e);
            SearchOutcome::Failure(e.kind())
        }
    }
}

/// Decode every hit in engine order. Never re-sorts.
pub fn extract_records(response: &Value) -> Result<Vec<ProductRecord>, ExtractError> {
    let root = response.as_object().ok_or(ExtractError::NotAMapping("response"))?;
    let outer = root
        .get("hits")
        .ok_or(ExtractError::MissingKey("hits"))?
        .as_object()
        .ok_or(ExtractError::NotAMapping("hits"))?;
    let hits = outer
        .get("hits")
        .ok_or(ExtractError::MissingKey("hits.hits"))?
        .as_array()
        .ok_or(ExtractError::NotASequence)?;

    hits.iter()
        .enumerate()
        .map(|(index, hit)| {
            let source = hit
                .get("_source")
                .filter(|s| s.is_object())
                .ok_or(ExtractError::MalformedHit(index))?;
            ProductRecord::deserialize(source).map_err(|e| ExtractError::Decode { index, source: e })
        })
        .collect()
}

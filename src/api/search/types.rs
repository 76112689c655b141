use serde::{Deserialize, Serialize};

use crate::models::ProductRecord;

pub const MSG_RESULTS: &str = "results";
pub const MSG_NONE_FOUND: &str = "none found";
pub const MSG_INVALID_BODY: &str = "invalid request body";
pub const MSG_INTERNAL_ERROR: &str = "internal server error";

/// Search response / 搜索响应
///
/// Same shape for every outcome; clients tell "nothing matched" from
/// "something broke" by `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    pub result: Option<Vec<ProductRecord>>,
}

impl SearchResponse {
    pub fn results(records: Vec<ProductRecord>) -> Self {
        Self {
            message: MSG_RESULTS.to_string(),
            result: Some(records),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: None,
        }
    }
}

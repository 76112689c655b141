//! Search outcome / 搜索结果分类

use thiserror::Error;

use crate::models::ProductRecord;

/// Why a search produced no usable answer / 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// Engine unreachable, timed out, non-2xx, or an unparseable envelope.
    #[error("search engine transport error")]
    TransportError,
    /// The envelope parsed but the hit list is not where it should be.
    #[error("malformed search engine response")]
    MalformedResponse,
    /// A hit's source document does not decode into a product.
    #[error("failed to decode product document")]
    DecodeError,
    /// The caller gave up before the engine answered.
    #[error("search cancelled")]
    Cancelled,
}

/// Result of one search call / 单次搜索结果
///
/// `Empty` is a successful search that matched nothing, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<ProductRecord>),
    Empty,
    Failure(FailureKind),
}

impl SearchOutcome {
    /// Wrap a decoded hit list, mapping an empty list to `Empty`.
    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        if records.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Results(records)
        }
    }
}

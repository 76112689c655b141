//! Product search pipeline / 商品搜索
//!
//! - `query`: validated request -> engine query (pure)
//! - `extract`: engine response -> typed outcome (pure)
//! - `gateway`: owns the engine client and runs the two around one network call

pub mod extract;
pub mod gateway;
pub mod outcome;
pub mod query;

pub use extract::{extract, ExtractError};
pub use gateway::{GatewayError, ProductSearcher, SearchGateway};
pub use outcome::{FailureKind, SearchOutcome};
pub use query::{build_query, EngineQuery, FieldBoosts};

mod query;
mod types;

pub use query::search;
pub use types::{SearchResponse, MSG_INTERNAL_ERROR, MSG_INVALID_BODY, MSG_NONE_FOUND, MSG_RESULTS};

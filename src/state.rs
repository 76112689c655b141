use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::search::ProductSearcher;

/// Shared handler state / 共享状态
pub struct AppState {
    pub searcher: Arc<dyn ProductSearcher>,
    /// Cancelled on shutdown; every request searches under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(searcher: Arc<dyn ProductSearcher>) -> Self {
        Self::with_shutdown(searcher, CancellationToken::new())
    }

    pub fn with_shutdown(searcher: Arc<dyn ProductSearcher>, shutdown: CancellationToken) -> Self {
        Self { searcher, shutdown }
    }
}

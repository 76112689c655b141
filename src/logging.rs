//! Tracing setup shared by both binaries / 日志初始化

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for an environment name. `RUST_LOG` takes precedence.
pub fn default_filter(env: &str) -> &'static str {
    match env {
        "production" => "simplesearch_backend=info,esmigrator=info,tower_http=info",
        _ => "simplesearch_backend=debug,esmigrator=debug,tower_http=debug",
    }
}

pub fn init(env: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(env).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use simplesearch_backend::config;
use simplesearch_backend::logging;
use simplesearch_backend::search::SearchGateway;
use simplesearch_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration / 加载配置
    let app_config = config::load_config()?;
    logging::init(&app_config.app.env);
    tracing::info!(
        "Starting {} ({}) on {}",
        app_config.app.service_name,
        app_config.app.env,
        app_config.bind_address()
    );

    let gateway = SearchGateway::connect(&app_config.engine_config(), app_config.search.boosts).await?;

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::with_shutdown(Arc::new(gateway), shutdown.clone()));
    let app = simplesearch_backend::api::router(state, app_config.request_timeout());

    let bind_addr = app_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT / SIGTERM, then cancel in-flight searches / 等待退出信号
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Signaled to shutdown");
    shutdown.cancel();
}

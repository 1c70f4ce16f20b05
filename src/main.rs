use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staking_cache::api::{create_rest_router, AppState};
use staking_cache::config::Config;
use staking_cache::services::{StakingRefresher, StakingStore};
use staking_cache::sources::ChainReader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,staking_cache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("✓ Configuration loaded");

    let store = StakingStore::open(Path::new(&config.database.path))?;
    tracing::info!("✓ Store opened at {}", config.database.path);

    let chain = ChainReader::connect(&config.chain.rpc_url)?;
    tracing::info!("✓ Chain reader using {}", config.chain.rpc_url);

    let refresher = Arc::new(StakingRefresher::new(Arc::new(chain), store.clone()));

    let background = (config.refresh.interval_secs > 0).then(|| {
        tracing::info!("Background refresh every {}s", config.refresh.interval_secs);
        spawn_refresh_loop(
            refresher.clone(),
            Duration::from_secs(config.refresh.interval_secs),
        )
    });

    let state = Arc::new(AppState { store, refresher });
    let app = create_rest_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!("✓ Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    if let Some(handle) = background {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

fn spawn_refresh_loop(refresher: Arc<StakingRefresher>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            let report = refresher.refresh_all().await;
            tracing::info!(
                "✓ Refresh cycle complete: {}/{} tokens updated",
                report.updated,
                report.results.len()
            );
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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

    tracing::info!("Shutdown signal received");
}

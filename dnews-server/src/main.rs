use std::sync::Arc;

use dnews_core::{
    spawn_refresher, FetchPlan, NewsApiClient, Refresher, ServiceConfig, SnapshotCache,
    TopicRegistry,
};
use dnews_server::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ServiceConfig::load();
    if !config.has_api_key() {
        warn!(
            "{} is not set; topics will stay empty until it is configured",
            dnews_core::config::API_KEY_ENV
        );
    }

    let topics = Arc::new(TopicRegistry::builtin());
    let cache = SnapshotCache::new();
    let client = NewsApiClient::new(&config)?;
    let refresher = Refresher::new(
        Arc::new(client),
        topics.clone(),
        cache.clone(),
        FetchPlan::from(config.clone()),
    );

    // Initial fill before serving; a failure here only means serving empty data.
    if let Err(err) = refresher.run_cycle().await {
        warn!(error = %err, "initial refresh failed");
    }
    let refresher = spawn_refresher(refresher, config.refresh_interval());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        topics = topics.topic_count(),
        "dnews server listening"
    );

    let app = build_router(AppState { cache, topics });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.stop().await?;
    info!("dnews server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

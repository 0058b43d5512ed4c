use std::net::SocketAddr;

use rail_feed::config::FeedConfig;
use rail_feed::loader::{CancelToken, FeedLoader, SharedNetwork};
use rail_feed::web::{AppState, create_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Address used when `BIND_ADDR` is not set.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rail_feed=info")),
        )
        .init();

    let config = FeedConfig::from_env().expect("Invalid feed configuration");
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .expect("BIND_ADDR must be host:port");

    info!(location = ?config.location, "starting");
    let refresh_interval = config.refresh_interval;
    let loader = FeedLoader::from_config(config).expect("Failed to create feed source");
    let cancel = CancelToken::new();

    // Fail fast if the feed cannot be loaded at start-up
    let network = loader.load(&cancel).await.expect("Failed to load feed");
    let shared = SharedNetwork::new(network);

    if let Some(interval) = refresh_interval {
        let shared = shared.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick is immediate
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = shared.reload(&loader, &cancel).await {
                    error!(error = %e, "feed refresh failed");
                }
            }
        });
    }

    let app = create_router(AppState::new(shared));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    info!(%addr, "rail feed API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            cancel.cancel();
        })
        .await
        .expect("Server error");
}

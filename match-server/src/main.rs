use match_server::config::load_config;
use match_server::registry::SessionRegistry;
use match_server::routes::router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
/// Activates tracing, loads the config, spawns a watch dog task to eliminate abandoned matches and
/// then serves the match endpoints.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace,tower_http=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true) // Module path (e.g. match_server::registry)
                .with_thread_ids(true) // Thread-ID (helpful for Tokio)
                .with_thread_names(true), // Thread-Name
        )
        .init();

    let config = match load_config().await {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(message, "Initial load error.");
            panic!("Initial load error: {}", message);
        }
    };

    let registry = Arc::new(SessionRegistry::new(config.channel_buffer_size));
    let watchdog_registry = registry.clone();
    let cleanup_interval = config.cleanup_interval();
    let idle_limit = config.idle_limit();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let removed = watchdog_registry.cleanup_idle(idle_limit).await;
            if removed > 0 {
                let remaining = watchdog_registry.len().await;
                tracing::info!(removed, remaining, "Removed abandoned matches.");
            }
        }
    });

    let app = router(registry).layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(?error, address = config.bind_address, "Could not bind.");
            panic!("Could not bind {}: {}", config.bind_address, error);
        }
    };
    tracing::info!(address = config.bind_address, "Match server listening.");

    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(?error, "Server stopped.");
    }
}

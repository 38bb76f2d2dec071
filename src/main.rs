use portal_shell::{
    AppState,
    config::{self, AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the shell host: configuration, logging, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().unwrap_or_else(|e| panic!("FATAL: {e}"));
    let config = config::init(config).unwrap_or_else(|e| panic!("FATAL: {e}"));

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the shell, info for HTTP plumbing.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_shell=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Shell starting in {:?} mode", config.env);
    tracing::info!(endpoint = %config.session_endpoint(), "Session checks target");

    // 4. Shared State
    let state = AppState::new(config.clone())
        .unwrap_or_else(|e| panic!("FATAL: could not build HTTP client: {e}"));

    // 5. Router and Server Startup
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: could not bind {}: {e}", config.bind_addr));

    tracing::info!("Listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
    }
}

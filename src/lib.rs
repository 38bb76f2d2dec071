use axum::{Router, http::HeaderName, routing::get};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session-gated navigation core.
pub mod boundary;
pub mod gate;
pub mod loader;
pub mod session;
pub mod shell;

// Page components and the collaborators they receive.
pub mod store;
pub mod view;
pub mod views;

// Host plumbing.
pub mod config;
pub mod error;
pub mod handlers;

// Route table, segregated by protection tier (Public, Authenticated, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use loader::DeferredViewLoader;
pub use routes::RouteTable;
pub use session::{HttpSessionVerifier, MockSessionVerifier, SessionVerifier};
pub use shell::{AppShell, Frame};

/// AppState
///
/// Implements the **Unified State Pattern** for the shell host. This is the single,
/// thread-safe and immutable container holding the services every navigation needs:
/// configuration, the outbound HTTP client, the view code registry and the route table.
///
/// Nothing in here is per-visitor. Every request mounts its own `AppShell`, with its
/// own gate and session status, and drops them when the response is written. The
/// only thing shared between visitors is view code, which the loader fetches once.
#[derive(Clone)]
pub struct AppState {
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
    /// HTTP client used for session checks. Carries the check timeout.
    pub client: reqwest::Client,
    /// View code registry. Fetched views stay cached for the process lifetime.
    pub loader: Arc<DeferredViewLoader>,
    pub routes: RouteTable,
}

impl AppState {
    /// Builds the host state around the portal's route table and view catalog.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.session_check_timeout)
            .build()?;

        Ok(Self {
            config,
            client,
            loader: Arc::new(views::catalog()),
            routes: RouteTable::portal(),
        })
    }
}

/// create_router
///
/// Assembles the host's routing structure, applies the global middleware stack,
/// and registers the application state.
///
/// *Mechanism*: The host claims only `/health`. Every other path reaches
/// `handlers::navigate` through the router's **Fallback Route**, where the
/// portal's own route table decides what it means. Protection is therefore
/// enforced by the shell's gate, not by per-route middleware.
///
/// The middleware stack provides **Request Correlation**: each navigation gets an
/// `x-request-id`, a tracing span tagged with it, and the same id echoed back on
/// the response.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Liveness probe, outside the routed region.
        .route("/health", get(|| async { "ok" }))
        .fallback(handlers::navigate)
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Request ID Generation: a unique UUID for every navigation.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // Request Tracing: one span per navigation, correlated by request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Request ID Propagation: echo x-request-id back to the browser.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`, tagging each span with the request ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "navigation",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

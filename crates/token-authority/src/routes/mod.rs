use crate::handlers::{auth_handler, jwks_handler};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use crate::handlers::auth_handler::AppState;

pub use crate::observability::metrics::init_metrics_recorder;

/// Build the application router.
///
/// `metrics_handle` renders the Prometheus exposition at `/metrics`.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics_handle);

    Router::new()
        // OAuth 2.0 client credentials grant
        .route("/oauth/token", post(auth_handler::handle_token))
        // JWKS endpoint (RFC 8414 well-known path)
        .route("/.well-known/jwks.json", get(jwks_handler::handle_get_jwks))
        .route("/health", get(health_check))
        .with_state(state)
        .merge(metrics_router)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

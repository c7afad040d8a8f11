use axum::{
    body::Body,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, put},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{request_id_middleware, request_span},
};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::health_check,
    metrics::metrics,
    session::{delete_cookie, write_cookie},
};
use crate::middleware::route_guard::route_guard_middleware;
use crate::session::bridge::COOKIE_BRIDGE_PATH;
use crate::AppState;

/// Front server: cookie bridge, health and metrics endpoints, and the
/// compiled web client behind the route guard. Unknown paths fall back to
/// `index.html` so the client router can take over.
pub fn build_router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let public_dir = public_dir.as_ref();
    let client = ServeDir::new(public_dir)
        .fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route(COOKIE_BRIDGE_PATH, put(write_cookie).delete(delete_cookie))
        .fallback_service(client)
        .layer(from_fn_with_state(
            state.route_rules.clone(),
            route_guard_middleware,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

//! Router assembly, mirroring the teacher's `rootsignal-api::main`
//! router-building shape: plain JSON handlers over an `Arc<AppState>`,
//! a permissive CORS layer (this surface is read-only and unauthenticated
//! by design — no session cookie to protect), and a request-scoped trace
//! span for structured logging.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, indicators, insights};
use crate::state::ApiState;

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/indicators", get(indicators::list_indicators))
        .route("/api/indicators/{indicator_id}", get(indicators::indicator_detail))
        .route("/api/indicators/{indicator_id}/history", get(indicators::indicator_history))
        .route("/api/indicators/{indicator_id}/events", get(indicators::indicator_events))
        .route("/api/national-activity-index", get(indicators::national_activity_index_handler))
        .route("/api/insights/{company_id}", get(insights::company_insights))
        .route("/admin/sources", get(admin::list_sources))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!("http_request", method = %request.method(), path = %request.uri().path())
            }),
        )
}

async fn health() -> &'static str {
    "ok"
}

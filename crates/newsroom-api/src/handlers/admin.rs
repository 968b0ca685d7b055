//! `/admin/sources` (SPEC_FULL.md §B.6, mirroring `backend/app/api/v1/endpoints/admin.py`):
//! a read-only reputation/auto-disable inspection surface, same scope as
//! the rest of L5 — no mutation endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use tracing::warn;

use crate::state::ApiState;

pub async fn list_sources(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match state.source_reputation.list_all().await {
        Ok(mut sources) => {
            sources.sort_by(|a, b| a.source_id.cmp(&b.source_id));
            Json(serde_json::json!({ "sources": sources, "degraded": false })).into_response()
        }
        Err(err) => {
            warn!(error = %err, "failed to list source reputations");
            Json(serde_json::json!({ "sources": [], "degraded": true })).into_response()
        }
    }
}

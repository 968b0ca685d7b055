//! `/api/insights/{company_id}` (spec §4.7): serves the cached bundle
//! `newsroom-pipeline`'s insight stage writes under `insights:{company_id}`
//! with a 15-minute TTL. This surface never recomputes — a cache miss
//! means no run has produced insights for that company yet, not an error.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use tracing::warn;

use crate::state::ApiState;

pub async fn company_insights(State(state): State<Arc<ApiState>>, Path(company_id): Path<String>) -> impl IntoResponse {
    let key = format!("insights:{company_id}");
    match state.kv.get(&key).await {
        Ok(Some(bytes)) => match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(bundle) => Json(serde_json::json!({ "insights": bundle, "degraded": false })).into_response(),
            Err(err) => {
                warn!(company_id, error = %err, "cached insight bundle failed to parse");
                Json(serde_json::json!({ "insights": null, "degraded": true })).into_response()
            }
        },
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            warn!(company_id, error = %err, "failed to read cached insight bundle");
            Json(serde_json::json!({ "insights": null, "degraded": true })).into_response()
        }
    }
}

//! `/api/indicators*` and `/api/national-activity-index` (spec §4.6):
//! read-only views over definitions, the latest/historical values, and
//! the recent events a run has appended.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{Duration, Utc};
use newsroom_indicators::{category_scores, national_activity_index, CategoryScore};
use serde::Deserialize;
use tracing::warn;

use crate::state::ApiState;

const DEFAULT_HISTORY_DAYS: i64 = 30;
const DEFAULT_EVENT_LIMIT: usize = 20;

#[derive(Deserialize)]
pub struct HistoryQuery {
    days: Option<i64>,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    limit: Option<usize>,
}

pub async fn list_indicators(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match state.indicator_definitions.list_active().await {
        Ok(definitions) => Json(serde_json::json!({ "indicators": definitions, "degraded": false })).into_response(),
        Err(err) => {
            warn!(error = %err, "failed to list indicator definitions");
            Json(serde_json::json!({ "indicators": [], "degraded": true })).into_response()
        }
    }
}

pub async fn indicator_detail(State(state): State<Arc<ApiState>>, Path(indicator_id): Path<String>) -> impl IntoResponse {
    let definition = match state.indicator_definitions.get(&indicator_id).await {
        Ok(Some(def)) => def,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            warn!(indicator_id, error = %err, "failed to load indicator definition");
            return Json(serde_json::json!({ "indicator": null, "degraded": true })).into_response();
        }
    };

    let latest = match state.indicator_values.latest(&indicator_id).await {
        Ok(value) => value,
        Err(err) => {
            warn!(indicator_id, error = %err, "failed to load latest indicator value");
            return Json(serde_json::json!({ "definition": definition, "latest": null, "degraded": true })).into_response();
        }
    };

    Json(serde_json::json!({ "definition": definition, "latest": latest, "degraded": false })).into_response()
}

pub async fn indicator_history(
    State(state): State<Arc<ApiState>>,
    Path(indicator_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> impl IntoResponse {
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, 365);
    let now = Utc::now();
    match state.indicator_values.range(&indicator_id, now - Duration::days(days), now).await {
        Ok(values) => Json(serde_json::json!({ "indicator_id": indicator_id, "values": values, "degraded": false })).into_response(),
        Err(err) => {
            warn!(indicator_id, error = %err, "failed to load indicator history");
            Json(serde_json::json!({ "indicator_id": indicator_id, "values": [], "degraded": true })).into_response()
        }
    }
}

pub async fn indicator_events(
    State(state): State<Arc<ApiState>>,
    Path(indicator_id): Path<String>,
    Query(params): Query<EventsQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(200);
    match state.indicator_events.recent(&indicator_id, limit).await {
        Ok(events) => Json(serde_json::json!({ "indicator_id": indicator_id, "events": events, "degraded": false })).into_response(),
        Err(err) => {
            warn!(indicator_id, error = %err, "failed to load indicator events");
            Json(serde_json::json!({ "indicator_id": indicator_id, "events": [], "degraded": true })).into_response()
        }
    }
}

/// National Activity Index over the current snapshot of active indicators
/// (spec §4.6 "Composite/category scores"). Indicators missing a value
/// this run are simply absent from the category roll-up, not an error.
pub async fn national_activity_index_handler(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let definitions = match state.indicator_definitions.list_active().await {
        Ok(definitions) => definitions,
        Err(err) => {
            warn!(error = %err, "failed to list indicator definitions for NAI");
            return Json(serde_json::json!({ "nai": null, "degraded": true })).into_response();
        }
    };

    let mut owned_values = Vec::with_capacity(definitions.len());
    let mut degraded = false;
    for definition in &definitions {
        match state.indicator_values.latest(&definition.indicator_id).await {
            Ok(Some(value)) => owned_values.push((definition.pestel_category, value)),
            Ok(None) => {}
            Err(err) => {
                warn!(indicator_id = %definition.indicator_id, error = %err, "failed to load value for NAI");
                degraded = true;
            }
        }
    }

    let pairs: Vec<(newsroom_common::PestelCategory, &newsroom_common::IndicatorValue)> =
        owned_values.iter().map(|(category, value)| (*category, value)).collect();
    let categories: Vec<CategoryScore> = category_scores(&pairs);

    match national_activity_index(&categories) {
        Some((nai, band)) => Json(serde_json::json!({
            "nai": nai,
            "band": band,
            "categories": categories.iter().map(|c| serde_json::json!({
                "category": c.category,
                "score": c.score,
                "confidence": c.confidence,
            })).collect::<Vec<_>>(),
            "degraded": degraded,
        }))
        .into_response(),
        None => Json(serde_json::json!({ "nai": null, "degraded": degraded })).into_response(),
    }
}

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::url::CheckInterval, services::checker, AppState};

/// Operator credential for the scheduler control endpoints. The routing
/// layer's user auth does not apply here; these act on process-wide state.
fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .map(|token| token == state.admin_token)
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Invalid operator credential" })),
    )
        .into_response()
}

pub async fn disable_scheduler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    state.scheduler.stop();
    Json(json!({ "success": true, "message": "Scheduler disabled." })).into_response()
}

pub async fn enable_scheduler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    match state.scheduler.enable() {
        Ok(()) => Json(json!({ "success": true, "message": "Scheduler enabled." })).into_response(),
        Err(e) => {
            tracing::error!("Failed to enable scheduler: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Failed to start scheduler" })),
            )
                .into_response()
        }
    }
}

/// Synchronous batch run for one interval tag, using the on-demand client.
pub async fn run_batch_now(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(interval): Path<String>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let interval = match interval.parse::<CheckInterval>() {
        Ok(interval) => interval,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": e })),
            )
                .into_response()
        }
    };

    let summary = checker::run_batch(&state.db, &state.http, interval).await;
    Json(json!({ "success": true, "message": "Batch completed", "data": summary })).into_response()
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    AppState,
    db::{check_log_repository::CheckLogRepository, url_repository::UrlRepository},
    handlers::url_handler::PageQuery,
    utils::jwt_auth::CurrentUser,
};

fn error_response(code: StatusCode, error: &str, message: &str) -> Response {
    (
        code,
        Json(json!({ "success": false, "error": error, "message": message })),
    )
        .into_response()
}

/// Check history for one URL, newest first. Existence and ownership are
/// checked separately so a foreign URL answers 403, not 404.
pub async fn list_logs(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
    Path(url_id): Path<u64>,
    Query(query): Query<PageQuery>,
) -> Response {
    let url_repo = UrlRepository::new(&state.db);

    match url_repo.exists(url_id).await {
        Ok(true) => {}
        Ok(false) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "URL not found",
                "The specified URL doesn't exist",
            )
        }
        Err(e) => {
            tracing::error!("Failed to verify URL existence for url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to verify URL existence",
            );
        }
    }

    match url_repo.get_by_id(url_id, user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(
                "user_id {} tried to access logs of url_id {} which is not theirs",
                user_id, url_id
            );
            return error_response(
                StatusCode::FORBIDDEN,
                "Access denied",
                "You don't have access to logs for this URL",
            );
        }
        Err(e) => {
            tracing::error!("Failed to verify URL ownership for url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to verify URL ownership",
            );
        }
    }

    let (limit, offset) = query.limit_offset();
    let log_repo = CheckLogRepository::new(&state.db);

    let total = match log_repo.count_for_url(url_id).await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("Failed to count logs for url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to get total log count",
            );
        }
    };

    let logs = match log_repo.list_for_url(url_id, limit, offset).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::error!("Failed to fetch logs for url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve logs",
            );
        }
    };

    let limit = limit as i64;
    Json(json!({
        "success": true,
        "message": "Logs retrieved successfully",
        "data": {
            "logs": logs,
            "pagination": {
                "total": total,
                "limit": limit,
                "offset": offset,
                "pages": (total + limit - 1) / limit,
            }
        }
    }))
    .into_response()
}

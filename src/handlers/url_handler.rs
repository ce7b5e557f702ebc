use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    db::{check_log_repository::CheckLogRepository, url_repository::UrlRepository},
    models::url::CheckInterval,
    services::probe,
    utils::{jwt_auth::CurrentUser, url_normalize::normalize_url},
};

#[derive(Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
    pub name: String,
    pub interval: Option<String>,
}

#[derive(Deserialize)]
pub struct EditUrlRequest {
    pub url: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn limit_offset(&self) -> (u32, u32) {
        let limit = self.limit.filter(|l| *l > 0).unwrap_or(10);
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);
        // Saturate rather than wrap for absurd page numbers; the query just
        // returns an empty slice past the end.
        (limit, page.saturating_sub(1).saturating_mul(limit))
    }
}

fn error_response(code: StatusCode, error: &str, message: &str) -> Response {
    (
        code,
        Json(json!({ "success": false, "error": error, "message": message })),
    )
        .into_response()
}

pub async fn create_url(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
    Json(body): Json<CreateUrlRequest>,
) -> Response {
    if body.url.len() < 5 || body.url.len() > 500 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            "url must be between 5 and 500 characters",
        );
    }
    if body.name.len() < 3 || body.name.len() > 100 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            "name must be between 3 and 100 characters",
        );
    }

    let interval = match body.interval.as_deref() {
        Some(raw) => match raw.parse::<CheckInterval>() {
            Ok(interval) => interval,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, "Validation failed", &e),
        },
        None => CheckInterval::SixHour,
    };

    let normalized = match normalize_url(&body.url) {
        Ok(url) => url,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "Invalid URL format", &e),
    };

    let url_repo = UrlRepository::new(&state.db);
    match url_repo.is_duplicate(user_id, &normalized, None).await {
        Ok(false) => {}
        Ok(true) => {
            return error_response(
                StatusCode::CONFLICT,
                "URL already exists",
                "This URL is already being monitored",
            )
        }
        Err(e) => {
            tracing::error!("Failed to check URL existence: {:?}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to check URL existence",
            );
        }
    }

    // Immediate synchronous probe so the row starts with a real status.
    let result = probe::probe(&state.http, &normalized).await;

    let url_id = match url_repo
        .create(user_id, &normalized, &body.name, interval, &result)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to save URL for user_id {}: {:?}", user_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to save URL",
            );
        }
    };

    // URL creation already succeeded; a lost first log entry is only a warning.
    let log_repo = CheckLogRepository::new(&state.db);
    if let Err(e) = log_repo.insert(url_id, &result).await {
        tracing::warn!("Failed to log initial check for url_id {}: {:?}", url_id, e);
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "URL added successfully",
            "data": {
                "id": url_id,
                "url": normalized,
                "name": body.name,
                "interval": interval,
                "status": result.status,
                "response_time": result.response_time_ms,
                "response_code": result.response_code,
            }
        })),
    )
        .into_response()
}

pub async fn list_urls(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Response {
    let (limit, offset) = query.limit_offset();

    let url_repo = UrlRepository::new(&state.db);
    let log_repo = CheckLogRepository::new(&state.db);

    let total = match url_repo.count_by_user(user_id).await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("Failed to count URLs for user_id {}: {:?}", user_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to get URL count",
            );
        }
    };

    let urls = match url_repo.list_by_user(user_id, limit, offset).await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!("Failed to list URLs for user_id {}: {:?}", user_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve URLs",
            );
        }
    };

    let mut items = Vec::with_capacity(urls.len());
    for url in urls {
        let latest = log_repo.latest_for_url(url.id).await.ok().flatten();
        let mut value = serde_json::to_value(&url).unwrap_or_else(|_| json!({}));
        if let Some(log) = latest {
            value["latest_check"] = serde_json::to_value(&log).unwrap_or(serde_json::Value::Null);
        }
        items.push(value);
    }

    let limit = limit as i64;
    Json(json!({
        "success": true,
        "message": "URLs retrieved successfully",
        "data": {
            "urls": items,
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

pub async fn update_url(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
    Path(url_id): Path<u64>,
    Json(body): Json<EditUrlRequest>,
) -> Response {
    if body.url.is_none() && body.name.is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            "At least one field (url or name) must be provided",
        );
    }
    if let Some(url) = &body.url {
        if url.len() < 5 || url.len() > 500 {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "url must be between 5 and 500 characters",
            );
        }
    }
    if let Some(name) = &body.name {
        if name.len() < 3 || name.len() > 100 {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "name must be between 3 and 100 characters",
            );
        }
    }

    let url_repo = UrlRepository::new(&state.db);
    let existing = match url_repo.get_by_id(url_id, user_id).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "URL not found",
                "The URL doesn't exist or doesn't belong to you",
            )
        }
        Err(e) => {
            tracing::error!("Failed to fetch url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve URL information",
            );
        }
    };

    let new_name = body.name.clone().unwrap_or_else(|| existing.name.clone());
    let mut final_url = existing.url.clone();
    let mut probed = None;

    if let Some(raw) = &body.url {
        let normalized = match normalize_url(raw) {
            Ok(url) => url,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, "Invalid URL format", &e),
        };

        if normalized != existing.url {
            match url_repo.is_duplicate(user_id, &normalized, Some(url_id)).await {
                Ok(false) => {}
                Ok(true) => {
                    return error_response(
                        StatusCode::CONFLICT,
                        "URL already exists",
                        "This URL is already being monitored",
                    )
                }
                Err(e) => {
                    tracing::error!("Failed to check URL existence: {:?}", e);
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error",
                        "Failed to check URL existence",
                    );
                }
            }

            // A changed address gets probed right away so the stored status
            // never describes the old URL.
            probed = Some(probe::probe(&state.http, &normalized).await);
            final_url = normalized;
        }
    }

    let rows = match url_repo
        .update(url_id, user_id, &final_url, &new_name, probed.as_ref())
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to update url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to update URL",
            );
        }
    };

    if rows == 0 {
        return error_response(
            StatusCode::NOT_FOUND,
            "URL not found",
            "The URL doesn't exist or doesn't belong to you",
        );
    }

    if let Some(result) = &probed {
        let log_repo = CheckLogRepository::new(&state.db);
        if let Err(e) = log_repo.insert(url_id, result).await {
            tracing::warn!("Failed to log check after edit for url_id {}: {:?}", url_id, e);
        }
    }

    let (status, response_time, response_code) = match &probed {
        Some(result) => (result.status, result.response_time_ms, result.response_code),
        None => (existing.status, existing.response_time, 0),
    };

    Json(json!({
        "success": true,
        "message": "URL updated successfully",
        "data": {
            "id": url_id,
            "url": final_url,
            "name": new_name,
            "status": status,
            "response_time": response_time,
            "response_code": response_code,
        }
    }))
    .into_response()
}

pub async fn delete_url(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
    Path(url_id): Path<u64>,
) -> Response {
    let url_repo = UrlRepository::new(&state.db);
    let log_repo = CheckLogRepository::new(&state.db);

    let existing = match url_repo.get_by_id(url_id, user_id).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "URL not found",
                "The URL doesn't exist or doesn't belong to you",
            )
        }
        Err(e) => {
            tracing::error!("Failed to fetch url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve URL information",
            );
        }
    };

    let logs_count = match log_repo.count_for_url(url_id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count logs for url_id {}: {:?}", url_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to count logs",
            );
        }
    };

    match url_repo.delete(url_id, user_id).await {
        Ok(0) => error_response(
            StatusCode::NOT_FOUND,
            "URL not found",
            "The URL doesn't exist or doesn't belong to you",
        ),
        Ok(_) => Json(json!({
            "success": true,
            "message": "URL and all associated logs deleted successfully",
            "data": {
                "url_id": url_id,
                "url_name": existing.name,
                "logs_count": logs_count,
            }
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to delete url_id {}: {:?}", url_id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to delete URL",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_first_page_of_ten() {
        let query = PageQuery { limit: None, page: None };
        assert_eq!(query.limit_offset(), (10, 0));
    }

    #[test]
    fn pagination_zero_values_fall_back_to_defaults() {
        let query = PageQuery { limit: Some(0), page: Some(0) };
        assert_eq!(query.limit_offset(), (10, 0));
    }

    #[test]
    fn pagination_offset_saturates_instead_of_wrapping() {
        let query = PageQuery { limit: Some(10), page: Some(u32::MAX) };
        let (limit, offset) = query.limit_offset();
        assert_eq!(limit, 10);
        assert_eq!(offset, u32::MAX);
    }

    #[test]
    fn pagination_computes_the_offset_for_a_later_page() {
        let query = PageQuery { limit: Some(25), page: Some(3) };
        assert_eq!(query.limit_offset(), (25, 50));
    }
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{services::auth_service::AuthService, AppState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    if body.name.len() < 3 || body.name.len() > 100 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "name must be between 3 and 100 characters" })),
        )
            .into_response();
    }
    if !body.email.contains('@') || body.email.len() > 150 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "a valid email is required" })),
        )
            .into_response();
    }
    if body.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "password must be at least 8 characters" })),
        )
            .into_response();
    }

    let auth_service = AuthService::new(&state.db, &state.jwt_secret);
    match auth_service.register_user(&body.name, &body.email, &body.password).await {
        Ok(token) => {
            tracing::info!("Registration successful for {}", body.email);
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "User registered successfully",
                    "data": { "token": token }
                })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!("Registration failed for {}: {}", body.email, err);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": err })),
            )
                .into_response()
        }
    }
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let auth_service = AuthService::new(&state.db, &state.jwt_secret);

    match auth_service.login_user(&body.email, &body.password).await {
        Ok(token) => {
            tracing::info!("Login successful for {}", body.email);
            Json(json!({
                "success": true,
                "message": "Logged in successfully",
                "data": { "token": token }
            }))
            .into_response()
        }
        Err(err) => {
            tracing::warn!("Login failed for {}: {}", body.email, err);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": err })),
            )
                .into_response()
        }
    }
}

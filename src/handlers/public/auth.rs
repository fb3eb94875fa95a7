// handlers/public/auth.rs - registration and login

use axum::extract::State;

use crate::database::models::UserView;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;

/// POST /api/auth/register, POST /api/users/register
///
/// Body: `{"username": "...", "email": "...", "password": "..."}` (`name` is
/// accepted for `username`). Answers 201 `{message, user}`.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<UserView> {
    let user = state.users().register(payload).await?;
    Ok(ApiResponse::created("user", user).with_message("User registered successfully"))
}

/// POST /api/users/login, POST /api/auth/login
///
/// Body: `{"email": "...", "password": "..."}`. Answers `{message, token, user}`.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.users().login(payload).await?;
    Ok(ApiResponse::flat(response).with_message("Login successful"))
}

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreateUserRequest, CurrentUser, UserDto};
use crate::services::{CreateUser, require_admin};

/// POST /users
/// Admin-only provisioning. Role defaults to staff.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    require_admin(&caller)?;

    let user = state
        .users()
        .create_user(CreateUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(UserDto::from(user)))))
}

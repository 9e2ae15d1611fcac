use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_login;
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::Principal;
use crate::services::AccessToken;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Missing fields deserialize as empty so `validate_login` reports them.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The authenticated user for the current request.
///
/// Inserted by [`auth_middleware`]; extracting it on an unprotected route
/// yields 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` to a live user before any
/// protected handler runs. Every failure is a plain 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(ApiError::unauthorized)?;

    let principal = state.auth().resolve(token).await?;

    tracing::Span::current().record("user_id", principal.id.value());
    request.extensions_mut().insert(CurrentUser(principal));

    Ok(next.run(request).await)
}

/// Pulls the token out of an `Authorization` header. The scheme is matched
/// case-insensitively.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Returns `{access_token, token_type}` on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AccessToken>, ApiError> {
    validate_login(&payload.username, &payload.password)?;

    let token = state
        .auth()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(token))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user)))
}

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, LoginRequest, MessageResponse};
use crate::domain::UserId;
use crate::models::Account;
use crate::services::Registration;

const SESSION_USER_KEY: &str = "user_id";

/// The authenticated account id, inserted by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a logged-in session and exposes the account id
/// to handlers as an `Extension<CurrentUser>`.
pub async fn auth_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user_id) = session_user(&session).await? else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    tracing::Span::current().record("user_id", user_id.value());
    request.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(request).await)
}

async fn session_user(session: &Session) -> Result<Option<UserId>, ApiError> {
    session
        .get::<UserId>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(registration) = payload?;
    let account = state.auth_service().register(registration).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// POST /auth/login
/// Verifies the credentials and binds the account to a fresh session id.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let Json(payload) = payload?;

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let account = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = %account.id, "User logged in");

    Ok(Json(ApiResponse::success(account)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user_id)): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = state.auth_service().get_account(user_id).await?;
    Ok(Json(ApiResponse::success(account)))
}

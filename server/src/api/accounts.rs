//! Authentication and account administration endpoints.
//!
//! - POST /api/auth/signup, /api/auth/login
//! - POST /api/auth/reset-password, /api/auth/update-password
//! - GET /api/auth/me
//! - POST /api/admin/setup (first run only), /api/admin/create-admin
//! - GET /api/admin/users?kind=
//! - PATCH /api/admin/users/:id/status

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use clientdesk_auth::{
    AdminRequest, LoginRequest, Profile, ResetPasswordRequest, Session, SignupRequest,
    StatusChange, StatusRequest, UpdatePasswordRequest,
};
use clientdesk_core::AccountKind;
use clientdesk_web::{
    AppError, CurrentUser, JsonBody, QueryParams, RequireAdmin, RequireSuperAdmin,
};
use serde::{Deserialize, Serialize};

/// Acknowledgement without a payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: &'static str,
}

/// Query of `GET /api/admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    /// `client` or `admin`; all accounts when absent.
    pub kind: Option<AccountKind>,
}

/// Register a client account.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state.auth.signup(&request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.auth.login(&request).await?))
}

/// Email a reset link; the answer is the same whether or not the email exists.
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.request_password_reset(&request).await?;
    Ok(Json(MessageResponse {
        message: "If the email is registered, a reset link has been sent",
    }))
}

/// Set a new password with a reset token.
pub async fn update_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.update_password(&request).await?;
    Ok(Json(MessageResponse {
        message: "Password updated",
    }))
}

/// The caller's profile.
pub async fn me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.auth.me(&user).await?))
}

/// Create the first super-admin.
pub async fn setup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AdminRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state.auth.setup_admin(&request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Create another admin.
pub async fn create_admin(
    RequireSuperAdmin(owner): RequireSuperAdmin,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AdminRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = state.auth.create_admin(&owner, &request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// List accounts.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UsersQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(state.auth.list_users(query.kind).await?))
}

/// Activate or deactivate an account.
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<StatusRequest>,
) -> Result<Json<StatusChange>, AppError> {
    Ok(Json(
        state.auth.set_active(&admin, &id, request.active).await?,
    ))
}

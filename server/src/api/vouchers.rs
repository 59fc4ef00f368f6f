//! Voucher endpoints. Administration is admin-only; any signed-in caller may
//! check a code against a subtotal.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use clientdesk_commerce::{ValidateVoucherRequest, VoucherInput};
use clientdesk_core::Money;
use clientdesk_core::commerce::{Voucher, VoucherCheck};
use clientdesk_web::{AppError, CurrentUser, JsonBody, RequireAdmin};

/// GET /api/vouchers
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Voucher>>, AppError> {
    Ok(Json(state.vouchers.list().await?))
}

/// POST /api/vouchers
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<VoucherInput>,
) -> Result<(StatusCode, Json<Voucher>), AppError> {
    let voucher = state.vouchers.create(input).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// PUT /api/vouchers/:id
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<VoucherInput>,
) -> Result<Json<Voucher>, AppError> {
    Ok(Json(state.vouchers.update(&id, input).await?))
}

/// DELETE /api/vouchers/:id
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.vouchers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/vouchers/validate
pub async fn validate(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ValidateVoucherRequest>,
) -> Result<Json<VoucherCheck>, AppError> {
    let check = state
        .vouchers
        .validate(&request.code, Money::from_minor(request.subtotal))
        .await?;
    Ok(Json(check))
}

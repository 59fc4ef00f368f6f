//! Hourly rate endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use clientdesk_booking::requests::SetRateRequest;
use clientdesk_core::{HourlyRate, Money};
use clientdesk_web::{AppError, JsonBody, RequireAdmin};

/// GET /api/hourly-rate
pub async fn current(State(state): State<AppState>) -> Result<Json<HourlyRate>, AppError> {
    Ok(Json(state.appointments.rates().current().await?))
}

/// POST /api/hourly-rate: replace the active rate.
pub async fn set(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SetRateRequest>,
) -> Result<(StatusCode, Json<HourlyRate>), AppError> {
    let amount = request
        .amount
        .map(Money::from_minor)
        .ok_or_else(|| AppError::validation("amount is required"))?;
    let rate = state
        .appointments
        .rates()
        .set(amount, Some(admin.account_id))
        .await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// GET /api/hourly-rate/history
pub async fn history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<HourlyRate>>, AppError> {
    Ok(Json(state.appointments.rates().history().await?))
}

//! Appointment endpoints.
//!
//! - POST /api/appointment - Book a slot (bearer optional)
//! - POST /api/appointment/verify-payment - Confirm a client payment
//! - POST /api/appointment/webhook - Gateway events (raw body, signed)
//! - GET /api/appointment/availability?date= - Free slots
//! - GET /api/appointment - List (admin)
//! - GET /api/appointment/:id - Details (admin)
//! - PATCH /api/appointment/:id/{cancel,reschedule,complete,no-show} (admin)
//! - POST /api/appointment/:id/refund (admin)

use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use clientdesk_booking::requests::{
    AvailabilityQuery, CancelRequest, CreateAppointmentRequest, ListQuery, RefundRequest,
    RescheduleRequest, VerifyPaymentRequest,
};
use clientdesk_booking::{
    AppointmentOutcome, CreatedAppointment, RefundOutcome, SIGNATURE_HEADER, WebhookReceipt,
};
use clientdesk_core::{Appointment, NaiveDate, TimeSlot};
use clientdesk_web::{AppError, JsonBody, MaybeUser, QueryParams, RequireAdmin};
use serde::Serialize;

/// Free slots on one day.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Requested day.
    pub date: NaiveDate,
    /// Bookable slots.
    pub slots: Vec<TimeSlot>,
}

/// Book a slot; links the booking to the caller's account when signed in.
pub async fn create(
    State(state): State<AppState>,
    MaybeUser(actor): MaybeUser,
    JsonBody(request): JsonBody<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<CreatedAppointment>), AppError> {
    let account_id = actor.map(|a| a.account_id);
    let created = state.appointments.create(&request, account_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Confirm payment with the gateway's checkout signature.
pub async fn verify_payment(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<VerifyPaymentRequest>,
) -> Result<Json<AppointmentOutcome>, AppError> {
    let proof = request.validate()?;
    Ok(Json(state.appointments.verify_payment(&proof).await?))
}

/// Gateway webhook; the body is verified before it is parsed.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookReceipt>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    Ok(Json(state.appointments.handle_webhook(&body, signature).await?))
}

/// Free slots on a day.
pub async fn availability(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = query.validate()?;
    let slots = state.appointments.availability(date).await?;
    Ok(Json(AvailabilityResponse { date, slots }))
}

/// Every appointment, newest first.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let date = query.date()?;
    Ok(Json(state.appointments.list(query.status, date).await?))
}

/// One appointment.
pub async fn get(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.appointments.get(&id).await?))
}

/// Cancel with an optional reason.
pub async fn cancel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<JsonBody<CancelRequest>>,
) -> Result<Json<AppointmentOutcome>, AppError> {
    let reason = body.and_then(|JsonBody(request)| request.reason);
    tracing::info!(admin = %admin.account_id, appointment_id = %id, "Cancelling appointment");
    Ok(Json(state.appointments.cancel(&id, reason).await?))
}

/// Move to a new date and start.
pub async fn reschedule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<RescheduleRequest>,
) -> Result<Json<AppointmentOutcome>, AppError> {
    let (date, start_time) = request.validate()?;
    Ok(Json(
        state.appointments.reschedule(&id, date, start_time).await?,
    ))
}

/// Mark as held.
pub async fn complete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentOutcome>, AppError> {
    Ok(Json(state.appointments.complete(&id).await?))
}

/// Mark as missed.
pub async fn no_show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentOutcome>, AppError> {
    Ok(Json(state.appointments.mark_no_show(&id).await?))
}

/// Refund the payment, fully or partially.
pub async fn refund(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<JsonBody<RefundRequest>>,
) -> Result<Json<RefundOutcome>, AppError> {
    let amount = match body {
        Some(JsonBody(request)) => request.validate()?,
        None => None,
    };
    tracing::info!(admin = %admin.account_id, appointment_id = %id, ?amount, "Refund requested");
    Ok(Json(state.appointments.refund(&id, amount).await?))
}

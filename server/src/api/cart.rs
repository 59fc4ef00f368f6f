//! Cart and checkout endpoints for the signed-in account.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use clientdesk_commerce::{
    CheckoutOutcome, CheckoutPaymentRequest, CheckoutRequest, CheckoutSession,
};
use clientdesk_core::commerce::{Cart, CheckoutOrder};
use clientdesk_web::{AppError, CurrentUser, JsonBody};
use serde::Deserialize;

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Catalog service to add.
    pub service_id: Option<String>,
}

/// GET /api/cart
pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(state.carts.get(&user.account_id).await?))
}

/// POST /api/cart/items
pub async fn add_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AddItemRequest>,
) -> Result<Json<Cart>, AppError> {
    let service_id = request
        .service_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("serviceId is required"))?;
    Ok(Json(state.carts.add(&user.account_id, &service_id).await?))
}

/// DELETE /api/cart/items/:service_id
pub async fn remove_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(state.carts.remove(&user.account_id, &service_id).await?))
}

/// POST /api/cart/checkout
pub async fn checkout(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    body: Option<JsonBody<CheckoutRequest>>,
) -> Result<(StatusCode, Json<CheckoutSession>), AppError> {
    let request = body.map(|JsonBody(request)| request).unwrap_or_default();
    let session = state.checkout.checkout(&user.account_id, &request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/cart/verify-payment
pub async fn verify_payment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(proof): JsonBody<CheckoutPaymentRequest>,
) -> Result<Json<CheckoutOutcome>, AppError> {
    Ok(Json(state.checkout.verify(&user.account_id, &proof).await?))
}

/// GET /api/cart/orders
pub async fn orders(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CheckoutOrder>>, AppError> {
    Ok(Json(state.checkout.orders(&user.account_id).await?))
}

//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the id assigned by the correlation middleware
//! - [`JsonBody`], [`QueryParams`]: JSON bodies and query strings whose
//!   rejections render as `VALIDATION_ERROR`
//! - [`BearerToken`]: the raw `Authorization: Bearer <token>` value
//! - [`CurrentUser`], [`MaybeUser`], [`RequireAdmin`], [`RequireSuperAdmin`]:
//!   the verified caller, resolved through the [`AuthService`] in state
//!
//! # Examples
//!
//! ```ignore
//! async fn cancel(
//!     RequireAdmin(admin): RequireAdmin,
//!     State(state): State<AppState>,
//!     Path(id): Path<String>,
//! ) -> Result<Json<AppointmentOutcome>, AppError> {
//!     tracing::info!(admin = %admin.account_id, %id, "Cancelling appointment");
//!     Ok(Json(state.appointments.cancel(&id, None).await?))
//! }
//! ```

use crate::error::AppError;
use crate::middleware;
use axum::{
    Json, async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use clientdesk_auth::AuthService;
use clientdesk_core::{Actor, Role};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Correlation ID for request tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        Ok(Self(
            middleware::from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`], but a missing content type or a malformed body
/// becomes a 400 `VALIDATION_ERROR` with the usual error envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::validation(rejection.body_text()))
    }
}

/// Query string parameters with the same rejection handling as [`JsonBody`].
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| AppError::validation(rejection.body_text()))
    }
}

/// Bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn parse(parts: &Parts) -> Result<Option<Self>, AppError> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?;
        Ok(Some(Self(token.to_string())))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts)?.ok_or_else(|| AppError::unauthorized("Missing authorization header"))
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let auth = AuthService::from_ref(state);
        Ok(Self(auth.authenticate(&token)?))
    }
}

/// Caller when a valid bearer token is present.
///
/// Public routes use this to link records to an account. A missing or
/// unusable token yields `None` rather than a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeUser(pub Option<Actor>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(Some(BearerToken(token))) = BearerToken::parse(parts) else {
            return Ok(Self(None));
        };
        match AuthService::from_ref(state).authenticate(&token) {
            Ok(actor) => Ok(Self(Some(actor))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable bearer token on public route");
                Ok(Self(None))
            }
        }
    }
}

/// Authenticated admin or super-admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireAdmin(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(actor) = CurrentUser::from_request_parts(parts, state).await?;
        if !actor.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self(actor))
    }
}

/// Authenticated super-admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireSuperAdmin(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(actor) = CurrentUser::from_request_parts(parts, state).await?;
        if actor.role != Role::SuperAdmin {
            return Err(AppError::forbidden("Super-admin access required"));
        }
        Ok(Self(actor))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        let mut parts = parts(Some("Bearer abc.def.ghi"));
        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn missing_or_malformed_bearer_is_unauthorized() {
        for header in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer ")] {
            let mut parts = parts(header);
            let err = BearerToken::from_request_parts(&mut parts, &())
                .await
                .unwrap_err();
            assert_eq!(err.code(), "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn correlation_id_prefers_the_middleware_value() {
        let id = Uuid::new_v4();
        let mut parts = parts(None);
        parts.extensions.insert(CorrelationId(id));
        let extracted = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(extracted, CorrelationId(id));
    }
}

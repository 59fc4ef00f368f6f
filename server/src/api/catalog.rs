//! Catalog endpoints: services, blog posts and team members.
//!
//! Reads are public; admins additionally see inactive services and drafts.
//! Writes require an admin.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use clientdesk_commerce::{BlogInput, ProfessionalInput, ServiceInput};
use clientdesk_core::catalog::{BlogPost, Professional, Service};
use clientdesk_web::{AppError, JsonBody, MaybeUser, RequireAdmin};

fn is_admin(user: &MaybeUser) -> bool {
    user.0.as_ref().is_some_and(clientdesk_core::Actor::is_admin)
}

// ============================================================================
// Services
// ============================================================================

/// GET /api/services
pub async fn list_services(
    State(state): State<AppState>,
    user: MaybeUser,
) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(state.catalog.list_services(is_admin(&user)).await?))
}

/// GET /api/services/:id
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    Ok(Json(state.catalog.get_service(&id).await?))
}

/// POST /api/services
pub async fn create_service(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let service = state.catalog.create_service(input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/:id
pub async fn update_service(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ServiceInput>,
) -> Result<Json<Service>, AppError> {
    Ok(Json(state.catalog.update_service(&id, input).await?))
}

/// DELETE /api/services/:id
pub async fn delete_service(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_service(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Blogs
// ============================================================================

/// GET /api/blogs
pub async fn list_blogs(
    State(state): State<AppState>,
    user: MaybeUser,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    Ok(Json(state.catalog.list_blogs(is_admin(&user)).await?))
}

/// GET /api/blogs/:id (id or slug)
pub async fn get_blog(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    Ok(Json(state.catalog.get_blog(&id, is_admin(&user)).await?))
}

/// POST /api/blogs
pub async fn create_blog(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BlogInput>,
) -> Result<(StatusCode, Json<BlogPost>), AppError> {
    let post = state.catalog.create_blog(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blogs/:id
pub async fn update_blog(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<BlogInput>,
) -> Result<Json<BlogPost>, AppError> {
    Ok(Json(state.catalog.update_blog(&id, input).await?))
}

/// DELETE /api/blogs/:id
pub async fn delete_blog(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_blog(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// People
// ============================================================================

/// GET /api/people
pub async fn list_people(
    State(state): State<AppState>,
) -> Result<Json<Vec<Professional>>, AppError> {
    Ok(Json(state.catalog.list_people().await?))
}

/// GET /api/people/:id
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Professional>, AppError> {
    Ok(Json(state.catalog.get_person(&id).await?))
}

/// POST /api/people
pub async fn create_person(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProfessionalInput>,
) -> Result<(StatusCode, Json<Professional>), AppError> {
    let person = state.catalog.create_person(input).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// PUT /api/people/:id
pub async fn update_person(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ProfessionalInput>,
) -> Result<Json<Professional>, AppError> {
    Ok(Json(state.catalog.update_person(&id, input).await?))
}

/// DELETE /api/people/:id
pub async fn delete_person(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_person(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Document endpoints.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use clientdesk_commerce::Upload;
use clientdesk_core::commerce::StoredDocument;
use clientdesk_web::{AppError, CurrentUser};

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// POST /api/documents (multipart, field `file`)
pub async fn upload(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredDocument>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        let document = state
            .documents
            .upload(
                &user.account_id,
                Upload {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                },
            )
            .await?;
        return Ok((StatusCode::CREATED, Json(document)));
    }
    Err(AppError::validation("file is required"))
}

/// GET /api/documents: own documents, or all for admins.
pub async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredDocument>>, AppError> {
    Ok(Json(state.documents.list(&user).await?))
}

/// DELETE /api/documents/:id
pub async fn delete(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.documents.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

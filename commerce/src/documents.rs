//! Uploaded client documents.

use crate::error::{CommerceError, Result};
use clientdesk_core::Actor;
use clientdesk_core::commerce::StoredDocument;
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use clientdesk_gateways::{DocumentGateway, FileMeta};
use std::sync::Arc;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Contents.
    pub bytes: Vec<u8>,
}

/// Validates, stores and indexes uploaded files.
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn Collection<StoredDocument>>,
    storage: Arc<dyn DocumentGateway>,
    clock: Arc<dyn Clock>,
}

impl DocumentService {
    /// Create a document service.
    #[must_use]
    pub fn new(
        documents: Arc<dyn Collection<StoredDocument>>,
        storage: Arc<dyn DocumentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            storage,
            clock,
        }
    }

    /// Store a file for `owner_id`.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::Validation`] when the file breaks the upload policy
    /// - [`CommerceError::Gateway`] when the bytes cannot be stored
    pub async fn upload(&self, owner_id: &str, upload: Upload) -> Result<StoredDocument> {
        let meta = FileMeta {
            file_name: upload.file_name.trim().to_string(),
            mime_type: upload.mime_type.trim().to_ascii_lowercase(),
            size: upload.bytes.len() as u64,
        };
        let check = self.storage.validate(&meta);
        if !check.valid {
            return Err(CommerceError::Validation(
                check.error.unwrap_or_else(|| "file rejected".to_string()),
            ));
        }

        let stored = self
            .storage
            .upload(&upload.bytes, &meta.file_name, &meta.mime_type, owner_id)
            .await?;
        let document = StoredDocument {
            id: new_id(),
            owner_id: owner_id.to_string(),
            file_name: meta.file_name,
            mime_type: meta.mime_type,
            size: meta.size,
            path: stored.path,
            url: stored.public_url,
            uploaded_at: self.clock.now(),
        };
        self.documents.insert(&document).await?;
        tracing::info!(
            document_id = %document.id,
            owner_id = %owner_id,
            size = document.size,
            "Document uploaded"
        );
        Ok(document)
    }

    /// Documents visible to `actor`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<StoredDocument>> {
        let filter = if actor.is_admin() {
            Filter::new()
        } else {
            Filter::new().eq("ownerId", actor.account_id.as_str())
        };
        let mut documents = self.documents.find(&filter).await?;
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(documents)
    }

    /// Delete a document. Stored bytes are removed best-effort first.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Forbidden`] unless the caller owns it or is an admin
    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<()> {
        let document = self
            .documents
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Document", id))?;
        if !actor.can_access(&document.owner_id) {
            return Err(CommerceError::Forbidden(
                "document belongs to another account".to_string(),
            ));
        }

        if let Err(err) = self.storage.delete(&document.path).await {
            tracing::warn!(document_id = %id, path = %document.path, error = %err, "Stored file not deleted");
        }
        self.documents.delete(id).await?;
        Ok(())
    }
}

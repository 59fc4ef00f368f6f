//! Filesystem-backed document storage.
//!
//! Files land under `<root>/<owner_id>/<uuid>-<sanitized name>` and are
//! served from `<public_base_url>/<path>` by whatever fronts the directory.

use crate::error::{GatewayError, Result};
use crate::providers::documents::{DocumentGateway, DocumentPolicy, FileMeta, FileValidation, StoredFile};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Local directory document store.
#[derive(Debug, Clone)]
pub struct LocalDocumentStorage {
    root: PathBuf,
    public_base_url: String,
    policy: DocumentPolicy,
}

impl LocalDocumentStorage {
    /// Store under `root`, publishing URLs below `public_base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            policy: DocumentPolicy::default(),
        }
    }

    /// Override the upload policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DocumentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve a relative storage path, refusing anything that escapes the root.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.is_empty() {
            return Err(GatewayError::InvalidInput(format!("invalid storage path {relative}")));
        }
        Ok(self.root.join(path))
    }
}

/// Keep letters, digits, dot, dash and underscore.
fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() { "file".to_string() } else { trimmed.to_string() }
}

#[async_trait]
impl DocumentGateway for LocalDocumentStorage {
    fn validate(&self, file: &FileMeta) -> FileValidation {
        self.policy.check(file)
    }

    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
        owner_id: &str,
    ) -> Result<StoredFile> {
        let verdict = self.validate(&FileMeta {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
        });
        if let Some(reason) = verdict.error {
            return Err(GatewayError::InvalidInput(reason));
        }

        let relative = format!(
            "{}/{}-{}",
            sanitize(owner_id),
            uuid::Uuid::new_v4(),
            sanitize(file_name)
        );
        let target = self.resolve(&relative)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::info!(path = %relative, size = bytes.len(), "Document stored");

        Ok(StoredFile {
            public_url: format!("{}/{relative}", self.public_base_url),
            path: relative,
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path, "Document already absent from storage");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

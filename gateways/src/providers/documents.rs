//! Document gateway contract and upload policy.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default upload cap: 5 MB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted by default.
pub const DEFAULT_ALLOWED_MIME: &[&str] = &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Metadata of an upload candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Client-supplied name.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Validation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidation {
    /// Whether the file may be stored.
    pub valid: bool,
    /// Why not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileValidation {
    /// Accepted.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// Rejected with a reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
        }
    }
}

/// Where a stored file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Storage path, the key for deletion.
    pub path: String,
    /// Retrieval URL.
    pub public_url: String,
}

/// Size and type limits for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPolicy {
    /// Largest accepted file.
    pub max_bytes: u64,
    /// Accepted MIME types, lowercase.
    pub allowed_mime: Vec<String>,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_mime: DEFAULT_ALLOWED_MIME.iter().map(ToString::to_string).collect(),
        }
    }
}

impl DocumentPolicy {
    /// Check a file against the policy.
    #[must_use]
    pub fn check(&self, file: &FileMeta) -> FileValidation {
        if file.file_name.trim().is_empty() {
            return FileValidation::rejected("file name is required");
        }
        if file.size == 0 {
            return FileValidation::rejected("file is empty");
        }
        if file.size > self.max_bytes {
            return FileValidation::rejected(format!(
                "file exceeds the {} MB limit",
                self.max_bytes / (1024 * 1024)
            ));
        }
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if !self.allowed_mime.iter().any(|allowed| *allowed == mime) {
            return FileValidation::rejected(format!(
                "file type {mime} is not allowed; upload PDF, JPEG or PNG"
            ));
        }
        FileValidation::ok()
    }
}

/// Document gateway trait
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// Validate metadata before reading the whole body.
    fn validate(&self, file: &FileMeta) -> FileValidation;

    /// Store bytes for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the bytes cannot be written.
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
        owner_id: &str,
    ) -> Result<StoredFile>;

    /// Remove a stored file.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be removed, `InvalidInput` for a
    /// path outside the store.
    async fn delete(&self, path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, mime: &str, size: u64) -> FileMeta {
        FileMeta {
            file_name: name.into(),
            mime_type: mime.into(),
            size,
        }
    }

    #[test]
    fn accepts_allowed_types_within_limit() {
        let policy = DocumentPolicy::default();
        assert!(policy.check(&meta("a.pdf", "application/pdf", 1024)).valid);
        assert!(policy.check(&meta("a.jpg", "image/jpg", 1024)).valid);
        assert!(policy.check(&meta("a.png", "IMAGE/PNG", DEFAULT_MAX_BYTES)).valid);
    }

    #[test]
    fn rejects_large_and_unknown_files() {
        let policy = DocumentPolicy::default();
        let big = policy.check(&meta("a.pdf", "application/pdf", DEFAULT_MAX_BYTES + 1));
        assert_eq!(big.error.as_deref(), Some("file exceeds the 5 MB limit"));
        assert!(!policy.check(&meta("a.exe", "application/x-msdownload", 10)).valid);
        assert!(!policy.check(&meta("a.pdf", "application/pdf", 0)).valid);
    }
}

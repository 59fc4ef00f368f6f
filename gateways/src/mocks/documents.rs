//! Mock document gateway.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock access

use crate::error::{GatewayError, Result};
use crate::providers::documents::{DocumentGateway, DocumentPolicy, FileMeta, FileValidation, StoredFile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock document gateway holding files in memory.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentGateway {
    policy: DocumentPolicy,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockDocumentGateway {
    /// Create an empty store with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored at `path`.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentGateway for MockDocumentGateway {
    fn validate(&self, file: &FileMeta) -> FileValidation {
        self.policy.check(file)
    }

    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        _mime_type: &str,
        owner_id: &str,
    ) -> Result<StoredFile> {
        let mut files = self.files.lock().unwrap();
        let path = format!("{owner_id}/{}-{file_name}", files.len() + 1);
        files.insert(path.clone(), bytes.to_vec());
        Ok(StoredFile {
            public_url: format!("https://files.example.com/{path}"),
            path,
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| GatewayError::Io(format!("no file at {path}")))
    }
}

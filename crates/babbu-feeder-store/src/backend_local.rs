// SPDX-License-Identifier: Apache-2.0

use crate::{Document, DocumentStore, StoreError, StoreErrorCode};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem backend for local development. Documents live under the same
/// relative paths as bucket objects; writes go through a temp file and a
/// rename so a crashed write never leaves a half-written document behind.
pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn document_path(&self, document: Document) -> PathBuf {
        self.root.join(document.object_path())
    }

    fn io_error(context: &str, path: &Path, e: &std::io::Error) -> StoreError {
        StoreError::new(
            StoreErrorCode::Io,
            format!("{context} {} failed: {e}", path.display()),
        )
    }
}

#[async_trait]
impl DocumentStore for LocalFsBackend {
    fn backend_tag(&self) -> &'static str {
        "localfs"
    }

    async fn load(&self, document: Document) -> Result<Option<Value>, StoreError> {
        let path = self.document_path(document);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error("read", &path, &e)),
        };
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Validation,
                format!("stored document {document} is not valid JSON: {e}"),
            )
        })?;
        Ok(Some(value))
    }

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
        let path = self.document_path(document);
        let parent = path.parent().ok_or_else(|| {
            StoreError::new(StoreErrorCode::Internal, "document path missing parent")
        })?;
        fs::create_dir_all(parent).map_err(|e| Self::io_error("create dir", parent, &e))?;

        let body = serde_json::to_vec_pretty(value).map_err(|e| {
            StoreError::new(StoreErrorCode::Internal, format!("serialize failed: {e}"))
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &body).map_err(|e| Self::io_error("write", &tmp, &e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error("rename", &path, &e))?;
        debug!(document = %document, path = %path.display(), "document saved");
        Ok(())
    }
}

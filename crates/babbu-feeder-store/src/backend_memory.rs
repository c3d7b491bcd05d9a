// SPDX-License-Identifier: Apache-2.0

use crate::{Document, DocumentStore, StoreError, StoreErrorCode};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// In-memory backend for tests. Counts calls so tests can assert that an
/// operation was (or was not) reached, and can be switched to fail every
/// request to exercise storage-error paths.
#[derive(Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<Document, Value>>,
    pub load_calls: AtomicU64,
    pub save_calls: AtomicU64,
    pub fail_requests: bool,
}

impl MemoryBackend {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_requests: true,
            ..Self::default()
        }
    }

    /// Seeds a document without touching the call counters.
    pub async fn seed(&self, document: Document, value: Value) {
        self.documents.lock().await.insert(document, value);
    }

    #[must_use]
    pub fn loads(&self) -> u64 {
        self.load_calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn saves(&self) -> u64 {
        self.save_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, document: Document) -> Result<Option<Value>, StoreError> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_requests {
            return Err(StoreError::new(
                StoreErrorCode::Network,
                "injected storage failure",
            ));
        }
        Ok(self.documents.lock().await.get(&document).cloned())
    }

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_requests {
            return Err(StoreError::new(
                StoreErrorCode::Network,
                "injected storage failure",
            ));
        }
        self.documents.lock().await.insert(document, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trip_law_holds() {
        let backend = MemoryBackend::default();
        let value = json!({"profile": {"name": "Babbu", "meals_per_day": 3}});
        backend
            .save(Document::CatProfile, &value)
            .await
            .expect("save");
        let loaded = backend
            .load(Document::CatProfile)
            .await
            .expect("load")
            .expect("present");
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn unwritten_document_is_none_not_an_error() {
        let backend = MemoryBackend::default();
        assert_eq!(backend.load(Document::WeightLog).await.expect("load"), None);
        assert_eq!(backend.loads(), 1);
    }

    #[tokio::test]
    async fn failing_backend_reports_storage_error() {
        let backend = MemoryBackend::failing();
        let err = backend
            .load(Document::WeightLog)
            .await
            .expect_err("must fail");
        assert_eq!(err.code, StoreErrorCode::Network);
    }
}

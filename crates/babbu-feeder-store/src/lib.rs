// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tokio::sync::{Mutex, MutexGuard};

pub const CRATE_NAME: &str = "babbu-feeder-store";

mod adapter;
mod backend_http;
mod backend_local;
mod backend_memory;
mod retry;

pub use adapter::{Documents, NewFood};
pub use backend_http::HttpBucketBackend;
pub use backend_local::LocalFsBackend;
pub use backend_memory::MemoryBackend;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    Config,
    Unauthorized,
    Network,
    Io,
    Validation,
    Internal,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "configuration_error",
            Self::Unauthorized => "unauthorized",
            Self::Network => "network_error",
            Self::Io => "io_error",
            Self::Validation => "validation_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// The three logical documents the service persists. Each maps to one fixed
/// object path; the path is the document's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Document {
    WeightLog,
    FoodCatalog,
    CatProfile,
}

pub const DOCUMENTS: [Document; 3] = [
    Document::WeightLog,
    Document::FoodCatalog,
    Document::CatProfile,
];

impl Document {
    #[must_use]
    pub const fn object_path(self) -> &'static str {
        match self {
            Self::WeightLog => "logs/logs.json",
            Self::FoodCatalog => "foods/foods.json",
            Self::CatProfile => "cat_profile/cat_profile.json",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeightLog => "weight_log",
            Self::FoodCatalog => "food_catalog",
            Self::CatProfile => "cat_profile",
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-document JSON persistence.
///
/// Contract: after a successful `save`, `load` on the same document returns
/// a value deeply equal to what was saved. A document never written loads as
/// `Ok(None)`; errors are reserved for configuration, authorization, and
/// backend failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn load(&self, document: Document) -> Result<Option<Value>, StoreError>;

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError>;
}

/// Per-document write serialization for in-process callers. Writers take the
/// document's mutex across their read-modify-write cycle so two handlers
/// cannot interleave on the same object.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    weight_log: Mutex<()>,
    food_catalog: Mutex<()>,
    cat_profile: Mutex<()>,
}

impl DocumentLocks {
    pub async fn hold(&self, document: Document) -> MutexGuard<'_, ()> {
        match document {
            Document::WeightLog => self.weight_log.lock().await,
            Document::FoodCatalog => self.food_catalog.lock().await,
            Document::CatProfile => self.cat_profile.lock().await,
        }
    }
}

/// Backend stand-in used when required storage settings are absent. Every
/// operation fails with a `Config` error naming the missing setting, before
/// any network or filesystem access.
pub struct UnconfiguredBackend {
    missing_setting: &'static str,
}

impl UnconfiguredBackend {
    #[must_use]
    pub fn new(missing_setting: &'static str) -> Self {
        Self { missing_setting }
    }

    fn error(&self) -> StoreError {
        StoreError::new(
            StoreErrorCode::Config,
            format!("storage is not configured: {} is not set", self.missing_setting),
        )
    }
}

#[async_trait]
impl DocumentStore for UnconfiguredBackend {
    fn backend_tag(&self) -> &'static str {
        "unconfigured"
    }

    async fn load(&self, _document: Document) -> Result<Option<Value>, StoreError> {
        Err(self.error())
    }

    async fn save(&self, _document: Document, _value: &Value) -> Result<(), StoreError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_paths_are_fixed() {
        assert_eq!(Document::WeightLog.object_path(), "logs/logs.json");
        assert_eq!(Document::FoodCatalog.object_path(), "foods/foods.json");
        assert_eq!(
            Document::CatProfile.object_path(),
            "cat_profile/cat_profile.json"
        );
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_with_config_error_naming_the_setting() {
        let backend = UnconfiguredBackend::new("GCS_BUCKET_NAME");
        for document in DOCUMENTS {
            let err = backend.load(document).await.expect_err("must fail");
            assert_eq!(err.code, StoreErrorCode::Config);
            assert!(err.message.contains("GCS_BUCKET_NAME"), "{}", err.message);
        }
        let err = backend
            .save(Document::WeightLog, &serde_json::json!({}))
            .await
            .expect_err("must fail");
        assert_eq!(err.code, StoreErrorCode::Config);
    }
}

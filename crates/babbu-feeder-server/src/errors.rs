// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use babbu_feeder_store::{StoreError, StoreErrorCode};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    #[serde(rename = "configuration_error")]
    ConfigurationError,
    #[serde(rename = "unauthorized")]
    Unauthorized,
    #[serde(rename = "storage_error")]
    StorageError,
    #[serde(rename = "not_found")]
    NotFound,
    #[serde(rename = "no_diet_plan")]
    NoDietPlan,
    #[serde(rename = "validation_failed")]
    ValidationFailed,
    #[serde(rename = "delivery_failed")]
    DeliveryFailed,
    #[serde(rename = "internal_error")]
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::Unauthorized => "unauthorized",
            Self::StorageError => "storage_error",
            Self::NotFound => "not_found",
            Self::NoDietPlan => "no_diet_plan",
            Self::ValidationFailed => "validation_failed",
            Self::DeliveryFailed => "delivery_failed",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }
}

/// Maps a storage failure onto the API taxonomy: configuration problems are
/// the operator's to fix, everything else from the backend is a storage
/// error on this surface.
#[must_use]
pub fn store_error_status(err: &StoreError) -> (StatusCode, ApiErrorCode) {
    match err.code {
        StoreErrorCode::Config => (StatusCode::INTERNAL_SERVER_ERROR, ApiErrorCode::ConfigurationError),
        _ => (StatusCode::BAD_GATEWAY, ApiErrorCode::StorageError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_to_wire_names() {
        for (code, wire) in [
            (ApiErrorCode::ConfigurationError, "configuration_error"),
            (ApiErrorCode::NoDietPlan, "no_diet_plan"),
            (ApiErrorCode::DeliveryFailed, "delivery_failed"),
        ] {
            let json = serde_json::to_string(&code).expect("serialize");
            assert_eq!(json, format!("\"{wire}\""));
            assert_eq!(code.as_str(), wire);
        }
    }

    #[test]
    fn config_store_errors_keep_their_kind() {
        let err = StoreError::new(StoreErrorCode::Config, "GCS_BUCKET_NAME is not set");
        let (status, code) = store_error_status(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, ApiErrorCode::ConfigurationError);

        let err = StoreError::new(StoreErrorCode::Unauthorized, "denied");
        let (status, code) = store_error_status(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, ApiErrorCode::StorageError);
    }
}

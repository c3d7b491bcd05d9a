// SPDX-License-Identifier: Apache-2.0

use crate::errors::{store_error_status, ApiError, ApiErrorCode};
use crate::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use babbu_feeder_store::StoreError;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Instant;

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

pub(crate) fn store_failure(err: &StoreError) -> Response {
    let (status, code) = store_error_status(err);
    api_error_response(status, error_json(code, &err.message, json!({})))
}

pub(crate) fn error_json(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError {
        code,
        message: message.to_string(),
        details,
    }
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let resp = (StatusCode::OK, "ok").into_response();
    state
        .metrics
        .observe_request("/healthz", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let storage_ready = state.documents.backend_tag() != "unconfigured";
    let (status, body) = if state.ready.load(Ordering::Relaxed) && storage_ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    };
    let resp = (status, body).into_response();
    state
        .metrics
        .observe_request("/readyz", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let payload = json!({
        "crate": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
    });
    let mut response = Json(payload).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=30") {
        response.headers_mut().insert("cache-control", value);
    }
    state
        .metrics
        .observe_request("/v1/version", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let body = state.metrics.render().await;
    let resp = (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response();
    with_request_id(resp, &request_id)
}

/// Read-only configuration diagnostics: which settings are present, never
/// their values for anything secret.
pub(crate) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let config = &state.config;
    let payload = json!({
        "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
        "storage": {
            "backend": state.documents.backend_tag(),
            "bucket_configured": config.bucket.is_some(),
            "credential_configured": config.storage_access_token.is_some(),
        },
        "email": {
            "api_key_configured": config.email_api_key.is_some(),
            "sender_configured": config.email_from.is_some(),
            "recipients": config.recipients,
        },
        "notifier": {
            "cat_id": config.cat_id,
            "secret_required": config.cron_secret_required(),
        },
    });
    let resp = Json(payload).into_response();
    state
        .metrics
        .observe_request("/v1/status", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

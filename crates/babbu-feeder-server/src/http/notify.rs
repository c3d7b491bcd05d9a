// SPDX-License-Identifier: Apache-2.0

use crate::errors::{store_error_status, ApiErrorCode};
use crate::http::handlers::{
    api_error_response, error_json, propagated_request_id, with_request_id,
};
use crate::notify::{send_daily_summary, NotifyError};
use crate::AppState;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};

/// The shared secret may arrive as a bearer credential or as the
/// scheduler's `x-cron-key` header.
fn caller_presents_secret(headers: &HeaderMap, secret: &str) -> bool {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if token.trim() == secret {
                return true;
            }
        }
    }
    headers
        .get("x-cron-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == secret)
}

/// The daily trigger. The external scheduler's only contract with this
/// service is invoking it; each successful call sends one fresh email.
pub(crate) async fn notify_daily_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let request_id = propagated_request_id(&headers, &state);
    let started = Instant::now();
    let route = "/v1/notify/daily";

    // Rejected callers must never reach storage or the email provider.
    if state.config.cron_secret_required() {
        let secret = state.config.cron_secret.as_deref().unwrap_or_default();
        if !caller_presents_secret(&headers, secret) {
            warn!(request_id = %request_id, "notifier invocation rejected: bad or missing secret");
            let resp = api_error_response(
                StatusCode::UNAUTHORIZED,
                error_json(
                    ApiErrorCode::Unauthorized,
                    "missing or invalid invocation secret",
                    json!({}),
                ),
            );
            state
                .metrics
                .observe_request(route, StatusCode::UNAUTHORIZED, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
    }

    let today = chrono::Utc::now().date_naive();
    let result = send_daily_summary(
        &state.documents,
        &state.config,
        state.email.as_deref(),
        today,
    )
    .await;

    let (status, resp) = match result {
        Ok(sent) => {
            info!(request_id = %request_id, recipients = sent.recipients, "daily summary sent");
            (
                StatusCode::OK,
                Json(json!({"sent": true, "recipients": sent.recipients})).into_response(),
            )
        }
        Err(NotifyError::NoDietPlan(msg)) => (
            StatusCode::NOT_FOUND,
            api_error_response(
                StatusCode::NOT_FOUND,
                error_json(
                    ApiErrorCode::NoDietPlan,
                    &format!("no diet plan found: {msg}"),
                    json!({}),
                ),
            ),
        ),
        Err(NotifyError::Config(msg)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_json(ApiErrorCode::ConfigurationError, &msg, json!({})),
            ),
        ),
        Err(NotifyError::Storage(err)) => {
            let (status, code) = store_error_status(&err);
            (
                status,
                api_error_response(status, error_json(code, &err.message, json!({}))),
            )
        }
        Err(NotifyError::Delivery(err)) => (
            StatusCode::BAD_GATEWAY,
            api_error_response(
                StatusCode::BAD_GATEWAY,
                error_json(ApiErrorCode::DeliveryFailed, &err.message, json!({})),
            ),
        ),
    };
    state
        .metrics
        .observe_request(route, status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

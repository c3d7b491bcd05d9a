// SPDX-License-Identifier: Apache-2.0

use babbu_feeder_server::{build_store, AppConfig, AppState};
use babbu_feeder_store::{Documents, MemoryBackend};
use serde_json::Value;
use std::sync::Arc;

mod support;

fn configured_state() -> AppState {
    let backend = Arc::new(MemoryBackend::default());
    let config = AppConfig {
        bucket: Some("babbu-feeder-data".to_string()),
        storage_access_token: Some("storage-token-value".to_string()),
        email_api_key: Some("email-key-value".to_string()),
        email_from: Some("feeder@example.com".to_string()),
        recipients: vec!["human@example.com".to_string()],
        cron_secret: Some("cron-secret-value".to_string()),
        ..AppConfig::default()
    };
    AppState::new(Arc::new(Documents::new(backend)), config, None)
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let addr = support::spawn_app(configured_state()).await;

    let (status, body) = support::get(addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    let (status, body) = support::get(addr, "/readyz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ready");
}

#[tokio::test]
async fn readiness_fails_when_storage_is_unconfigured() {
    let config = AppConfig::default();
    let store = build_store(&config);
    let state = AppState::new(Arc::new(Documents::new(store)), config, None);
    let addr = support::spawn_app(state).await;

    let (status, body) = support::get(addr, "/readyz").await;
    assert_eq!(status, 503);
    assert_eq!(body, "not-ready");
}

#[tokio::test]
async fn status_reports_presence_without_secret_values() {
    let addr = support::spawn_app(configured_state()).await;

    let (status, body) = support::get(addr, "/v1/status").await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");

    assert_eq!(payload["storage"]["backend"], "memory");
    assert_eq!(payload["storage"]["bucket_configured"], true);
    assert_eq!(payload["storage"]["credential_configured"], true);
    assert_eq!(payload["email"]["api_key_configured"], true);
    assert_eq!(payload["email"]["sender_configured"], true);
    assert_eq!(payload["email"]["recipients"][0], "human@example.com");
    assert_eq!(payload["notifier"]["cat_id"], "babbu");
    assert_eq!(payload["notifier"]["secret_required"], true);

    assert!(!body.contains("storage-token-value"));
    assert!(!body.contains("email-key-value"));
    assert!(!body.contains("cron-secret-value"));
}

#[tokio::test]
async fn metrics_count_served_requests() {
    let addr = support::spawn_app(configured_state()).await;

    support::get(addr, "/healthz").await;
    support::get(addr, "/healthz").await;

    let (status, body) = support::get(addr, "/metrics").await;
    assert_eq!(status, 200);
    assert!(
        body.contains("babbu_feeder_http_requests_total{route=\"/healthz\",status=\"200\"} 2"),
        "body: {body}"
    );
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let addr = support::spawn_app(configured_state()).await;

    let raw = support::request_raw(addr, "GET", "/healthz", &[], None).await;
    assert!(raw.to_ascii_lowercase().contains("x-request-id:"), "raw: {raw}");

    // Propagated ids are echoed back verbatim.
    let raw = support::request_raw(
        addr,
        "GET",
        "/v1/notify/daily-missing",
        &[("x-request-id", "req-propagated-1")],
        None,
    )
    .await;
    assert!(raw.contains("req-propagated-1"), "raw: {raw}");
}

#[tokio::test]
async fn version_reports_crate_and_schema() {
    let addr = support::spawn_app(configured_state()).await;
    let (status, body) = support::get(addr, "/v1/version").await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["crate"], "babbu-feeder-server");
    assert_eq!(payload["config_schema_version"], "1");
}

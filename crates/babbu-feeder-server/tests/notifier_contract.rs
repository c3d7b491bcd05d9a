// SPDX-License-Identifier: Apache-2.0

use babbu_feeder_server::{AppConfig, AppState, EmailProvider, RecordingEmailProvider};
use babbu_feeder_store::{Document, Documents, MemoryBackend};
use serde_json::json;
use std::sync::Arc;

mod support;

const YOUTIAO_DOC: &str = r#"{"name":"Youtiao","diet":{"meals":[{"food":"Chicken","grams":50},{"food":"Chicken","grams":45}]},"life_stage_override":null}"#;

fn notifier_config() -> AppConfig {
    AppConfig {
        email_from: Some("feeder@example.com".to_string()),
        email_api_key: Some("test-key".to_string()),
        recipients: vec![
            "human-one@example.com".to_string(),
            "human-two@example.com".to_string(),
        ],
        ..AppConfig::default()
    }
}

fn app_state(
    backend: Arc<MemoryBackend>,
    provider: Arc<RecordingEmailProvider>,
    config: AppConfig,
) -> AppState {
    AppState::new(
        Arc::new(Documents::new(backend)),
        config,
        Some(provider as Arc<dyn EmailProvider>),
    )
}

#[tokio::test]
async fn stored_plan_is_rendered_and_fanned_out_to_all_recipients() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            serde_json::from_str(YOUTIAO_DOC).expect("seed doc"),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::default());
    let addr = support::spawn_app(app_state(backend, provider.clone(), notifier_config())).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("\"sent\":true"), "body: {body}");
    assert!(body.contains("\"recipients\":2"), "body: {body}");

    assert_eq!(provider.calls(), 1);
    let sent = provider.sent.lock().await;
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.from, "feeder@example.com");
    assert_eq!(
        message.to,
        vec![
            "human-one@example.com".to_string(),
            "human-two@example.com".to_string()
        ]
    );
    assert!(message.html.contains("Youtiao"));
    assert!(message.html.contains("Chicken — 50g"));
    assert!(message.html.contains("Chicken — 45g"));
    assert!(message.subject.contains("Youtiao"));
}

#[tokio::test]
async fn missing_profile_yields_no_diet_plan_and_no_email() {
    let backend = Arc::new(MemoryBackend::default());
    let provider = Arc::new(RecordingEmailProvider::default());
    let addr = support::spawn_app(app_state(backend, provider.clone(), notifier_config())).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 404, "body: {body}");
    assert!(body.contains("no_diet_plan"), "body: {body}");
    assert!(body.contains("no diet plan found"), "body: {body}");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn profile_without_meals_yields_no_diet_plan() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            json!({"name": "Babbu", "diet": {"meals": []}}),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::default());
    let addr = support::spawn_app(app_state(backend, provider.clone(), notifier_config())).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 404, "body: {body}");
    assert!(body.contains("no_diet_plan"), "body: {body}");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn wrong_or_missing_secret_is_rejected_before_any_storage_read() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            serde_json::from_str(YOUTIAO_DOC).expect("seed doc"),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::default());
    let config = AppConfig {
        cron_secret: Some("the-secret".to_string()),
        ..notifier_config()
    };
    let addr =
        support::spawn_app(app_state(backend.clone(), provider.clone(), config)).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 401, "body: {body}");
    assert!(body.contains("unauthorized"), "body: {body}");

    let (status, _) = support::request(
        addr,
        "POST",
        "/v1/notify/daily",
        &[("Authorization", "Bearer wrong")],
        None,
    )
    .await;
    assert_eq!(status, 401);

    // Rejected invocations must not touch storage or the provider.
    assert_eq!(backend.loads(), 0);
    assert_eq!(provider.calls(), 0);

    let (status, _) = support::request(
        addr,
        "POST",
        "/v1/notify/daily",
        &[("Authorization", "Bearer the-secret")],
        None,
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = support::request(
        addr,
        "POST",
        "/v1/notify/daily",
        &[("x-cron-key", "the-secret")],
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn provider_rejection_surfaces_as_delivery_failure() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            serde_json::from_str(YOUTIAO_DOC).expect("seed doc"),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::failing());
    let addr = support::spawn_app(app_state(backend, provider.clone(), notifier_config())).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 502, "body: {body}");
    assert!(body.contains("delivery_failed"), "body: {body}");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn missing_recipients_is_a_configuration_error() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            serde_json::from_str(YOUTIAO_DOC).expect("seed doc"),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::default());
    let config = AppConfig {
        recipients: Vec::new(),
        ..notifier_config()
    };
    let addr = support::spawn_app(app_state(backend, provider.clone(), config)).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 500, "body: {body}");
    assert!(body.contains("configuration_error"), "body: {body}");
    assert!(body.contains("DAILY_EMAIL_RECIPIENTS"), "body: {body}");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_error() {
    let backend = Arc::new(MemoryBackend::failing());
    let provider = Arc::new(RecordingEmailProvider::default());
    let addr = support::spawn_app(app_state(backend, provider.clone(), notifier_config())).await;

    let (status, body) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 502, "body: {body}");
    assert!(body.contains("storage_error"), "body: {body}");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn scoped_profile_map_selects_the_configured_cat() {
    let backend = Arc::new(MemoryBackend::default());
    backend
        .seed(
            Document::CatProfile,
            json!({"profiles": {
                "babbu": {"name": "Babbu", "diet": {"meals": [{"food": "Salmon", "grams": 30}]}},
                "youtiao": serde_json::from_str::<serde_json::Value>(YOUTIAO_DOC).expect("doc")
            }}),
        )
        .await;
    let provider = Arc::new(RecordingEmailProvider::default());
    let config = AppConfig {
        cat_id: "youtiao".to_string(),
        ..notifier_config()
    };
    let addr = support::spawn_app(app_state(backend, provider.clone(), config)).await;

    let (status, _) = support::request(addr, "POST", "/v1/notify/daily", &[], None).await;
    assert_eq!(status, 200);
    let sent = provider.sent.lock().await;
    assert!(sent[0].html.contains("Youtiao"));
    assert!(!sent[0].html.contains("Salmon"));
}

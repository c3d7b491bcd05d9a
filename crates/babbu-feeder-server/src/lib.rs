// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::routing::{delete, get, post, put};
use axum::Router;
use babbu_feeder_store::{
    Documents, DocumentStore, HttpBucketBackend, LocalFsBackend, RetryPolicy, UnconfiguredBackend,
};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

pub const CRATE_NAME: &str = "babbu-feeder-server";

pub mod config;
mod errors;
mod http;
mod middleware;
pub mod notify;
mod telemetry;

pub use config::{parse_recipient_list, validate_startup_config_contract, AppConfig};
pub use errors::{ApiError, ApiErrorCode};
pub use notify::{
    send_daily_summary, EmailError, EmailProvider, HttpEmailProvider, NotifyError, OutboundEmail,
    RecordingEmailProvider,
};
pub use telemetry::RequestMetrics;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<Documents>,
    pub config: Arc<AppConfig>,
    pub email: Option<Arc<dyn EmailProvider>>,
    pub ready: Arc<AtomicBool>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(
        documents: Arc<Documents>,
        config: AppConfig,
        email: Option<Arc<dyn EmailProvider>>,
    ) -> Self {
        Self {
            documents,
            config: Arc::new(config),
            email,
            ready: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Selects the storage backend from the configuration: an explicit data
/// directory wins, then the HTTP bucket; with neither configured every
/// storage operation reports the missing bucket setting.
#[must_use]
pub fn build_store(config: &AppConfig) -> Arc<dyn DocumentStore> {
    if let Some(root) = &config.data_dir {
        return Arc::new(LocalFsBackend::new(root.clone()));
    }
    match &config.bucket {
        Some(bucket) => Arc::new(HttpBucketBackend::new(
            config.storage_base_url.clone(),
            bucket.clone(),
            config.storage_access_token.clone(),
            RetryPolicy::default(),
        )),
        None => Arc::new(UnconfiguredBackend::new("GCS_BUCKET_NAME")),
    }
}

/// The email provider exists only when an API key is configured; the
/// notifier reports the missing key otherwise.
#[must_use]
pub fn build_email_provider(config: &AppConfig) -> Option<Arc<dyn EmailProvider>> {
    config.email_api_key.as_ref().map(|key| {
        Arc::new(HttpEmailProvider::new(
            config.email_base_url.clone(),
            key.clone(),
        )) as Arc<dyn EmailProvider>
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/v1/status", get(http::handlers::status_handler))
        .route(
            "/v1/profile",
            get(http::profile::profile_handler).put(http::profile::put_profile_handler),
        )
        .route(
            "/v1/weights",
            get(http::records::weights_handler).post(http::records::add_weight_handler),
        )
        .route(
            "/v1/foods",
            get(http::records::foods_handler).post(http::records::add_food_handler),
        )
        .route("/v1/foods/:id", delete(http::records::delete_food_handler))
        .route("/v1/diet", put(http::profile::put_diet_handler))
        .route("/v1/plan", get(http::profile::plan_handler))
        .route("/v1/notify/daily", post(http::notify::notify_daily_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use babbu_feeder_server::{
    build_email_provider, build_router, build_store, parse_recipient_list,
    validate_startup_config_contract, AppConfig, AppState,
};
use babbu_feeder_store::Documents;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn load_config_from_env() -> AppConfig {
    let defaults = AppConfig::default();
    let bind_addr = env_string("BIND_ADDR").unwrap_or_else(|| {
        let port = env_string("PORT").unwrap_or_else(|| "8080".to_string());
        format!("0.0.0.0:{port}")
    });
    AppConfig {
        bucket: env_string("GCS_BUCKET_NAME"),
        storage_base_url: env_string("GCS_BASE_URL").unwrap_or(defaults.storage_base_url),
        storage_access_token: env_string("GCS_ACCESS_TOKEN"),
        data_dir: env_string("BABBU_DATA_DIR").map(PathBuf::from),
        email_api_key: env_string("EMAIL_API_KEY"),
        email_base_url: env_string("EMAIL_API_BASE_URL").unwrap_or(defaults.email_base_url),
        email_from: env_string("EMAIL_FROM"),
        recipients: env_string("DAILY_EMAIL_RECIPIENTS")
            .map(|raw| parse_recipient_list(&raw))
            .unwrap_or_default(),
        cat_id: env_string("DAILY_EMAIL_CAT_ID").unwrap_or(defaults.cat_id),
        cron_secret: env_string("CRON_SECRET"),
        bind_addr,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config_from_env();
    if let Err(message) = validate_startup_config_contract(&config) {
        error!(%message, "invalid configuration");
        std::process::exit(2);
    }

    let store = build_store(&config);
    info!(backend = store.backend_tag(), cat_id = %config.cat_id, "storage backend selected");
    let email = build_email_provider(&config);
    if email.is_none() {
        info!("EMAIL_API_KEY not set; notifier will report a configuration error when invoked");
    }

    let bind_addr = config.bind_addr.clone();
    let documents = Arc::new(Documents::new(store));
    let state = AppState::new(documents, config, email);
    let app = build_router(state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%bind_addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(%bind_addr, "babbu feeder listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::path::PathBuf;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";
pub const DEFAULT_EMAIL_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_CAT_ID: &str = "babbu";

/// Process-wide settings, loaded once at startup and passed to the
/// components that need them. Secrets stay out of the `Serialize` output.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// `GCS_BUCKET_NAME`; absence turns every storage operation into a
    /// configuration error instead of a network call.
    pub bucket: Option<String>,
    /// `GCS_BASE_URL` override for emulators and tests.
    pub storage_base_url: String,
    /// `GCS_ACCESS_TOKEN` bearer credential.
    #[serde(skip_serializing)]
    pub storage_access_token: Option<String>,
    /// `BABBU_DATA_DIR`; selects the local filesystem backend when set.
    pub data_dir: Option<PathBuf>,
    /// `EMAIL_API_KEY` for the transactional email provider.
    #[serde(skip_serializing)]
    pub email_api_key: Option<String>,
    /// `EMAIL_API_BASE_URL` override.
    pub email_base_url: String,
    /// `EMAIL_FROM` verified sender.
    pub email_from: Option<String>,
    /// `DAILY_EMAIL_RECIPIENTS`, comma-separated.
    pub recipients: Vec<String>,
    /// `DAILY_EMAIL_CAT_ID`.
    pub cat_id: String,
    /// `CRON_SECRET`; when set the notifier requires it from callers.
    #[serde(skip_serializing)]
    pub cron_secret: Option<String>,
    /// `BIND_ADDR` (or `PORT`) for the server binary.
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            storage_base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
            storage_access_token: None,
            data_dir: None,
            email_api_key: None,
            email_base_url: DEFAULT_EMAIL_BASE_URL.to_string(),
            email_from: None,
            recipients: Vec::new(),
            cat_id: DEFAULT_CAT_ID.to_string(),
            cron_secret: None,
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn cron_secret_required(&self) -> bool {
        self.cron_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Splits a comma-separated recipient list, dropping empty segments.
#[must_use]
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Startup contract: settings that are present must be well-formed. Absent
/// settings are allowed here; the operation that needs one reports the
/// configuration error at use.
pub fn validate_startup_config_contract(config: &AppConfig) -> Result<(), String> {
    if config.cat_id.trim().is_empty() {
        return Err("DAILY_EMAIL_CAT_ID must not be blank".to_string());
    }
    if config.bucket.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Err("GCS_BUCKET_NAME must not be blank when set".to_string());
    }
    if config.storage_base_url.trim().is_empty() {
        return Err("GCS_BASE_URL must not be blank".to_string());
    }
    if config.email_base_url.trim().is_empty() {
        return Err("EMAIL_API_BASE_URL must not be blank".to_string());
    }
    for recipient in &config.recipients {
        if !recipient.contains('@') {
            return Err(format!(
                "DAILY_EMAIL_RECIPIENTS entry is not an address: {recipient}"
            ));
        }
    }
    if config
        .email_from
        .as_deref()
        .is_some_and(|f| !f.contains('@'))
    {
        return Err("EMAIL_FROM is not an address".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_list_parsing_trims_and_drops_empties() {
        assert_eq!(
            parse_recipient_list("a@example.com, b@example.com ,,"),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(parse_recipient_list("").is_empty());
    }

    #[test]
    fn startup_contract_rejects_malformed_present_settings() {
        let mut config = AppConfig {
            recipients: vec!["not-an-address".to_string()],
            ..AppConfig::default()
        };
        let err = validate_startup_config_contract(&config).expect_err("bad recipient");
        assert!(err.contains("not an address"), "{err}");

        config.recipients.clear();
        config.bucket = Some("  ".to_string());
        let err = validate_startup_config_contract(&config).expect_err("blank bucket");
        assert!(err.contains("GCS_BUCKET_NAME"), "{err}");
    }

    #[test]
    fn startup_contract_allows_absent_settings() {
        let config = AppConfig::default();
        assert!(validate_startup_config_contract(&config).is_ok());
    }

    #[test]
    fn serialized_config_carries_no_secret_values() {
        let config = AppConfig {
            storage_access_token: Some("token-value".to_string()),
            email_api_key: Some("key-value".to_string()),
            cron_secret: Some("secret-value".to_string()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("token-value"));
        assert!(!json.contains("key-value"));
        assert!(!json.contains("secret-value"));
    }
}

// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailError {
    pub message: String,
}

impl EmailError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for EmailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "delivery failed: {}", self.message)
    }
}

impl std::error::Error for EmailError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Transactional email delivery seam. One `send` dispatches one message to
/// every address in `to`.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn provider_tag(&self) -> &'static str;

    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}

/// HTTP provider client (Resend-compatible surface): POST `{base}/emails`
/// with a bearer API key. Rejections surface to the caller; there is no
/// automatic retry for deliveries.
pub struct HttpEmailProvider {
    base_url: String,
    api_key: String,
}

impl HttpEmailProvider {
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

const ERROR_BODY_EXCERPT_LEN: usize = 200;

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    fn provider_tag(&self) -> &'static str {
        "http_email"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let url = format!("{}/emails", self.base_url);
        let payload = json!({
            "from": email.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.html,
        });
        let resp = self
            .client()
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::new(format!("email provider unreachable: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            debug!(recipients = email.to.len(), "email dispatched");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT_LEN).collect();
        Err(EmailError::new(format!(
            "email provider rejected send status={status}: {excerpt}"
        )))
    }
}

/// Test double: records every outbound message and can be switched to
/// reject sends.
#[derive(Default)]
pub struct RecordingEmailProvider {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub send_calls: AtomicU64,
    pub fail_sends: bool,
}

impl RecordingEmailProvider {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn calls(&self) -> u64 {
        self.send_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    fn provider_tag(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        self.send_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_sends {
            return Err(EmailError::new("injected provider rejection"));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

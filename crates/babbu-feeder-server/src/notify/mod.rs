// SPDX-License-Identifier: Apache-2.0

use crate::config::AppConfig;
use babbu_feeder_store::{Documents, StoreError};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use tracing::info;

pub(crate) mod email;
pub(crate) mod render;

pub use email::{EmailError, EmailProvider, HttpEmailProvider, OutboundEmail, RecordingEmailProvider};

#[derive(Debug)]
#[non_exhaustive]
pub enum NotifyError {
    Config(String),
    Storage(StoreError),
    NoDietPlan(String),
    Delivery(EmailError),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "notifier is not configured: {msg}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::NoDietPlan(msg) => write!(f, "no diet plan found: {msg}"),
            Self::Delivery(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<StoreError> for NotifyError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySummarySent {
    pub recipients: usize,
}

/// Loads the current diet plan and emails the daily summary: one outbound
/// message per invocation, fanned out to every configured recipient.
pub async fn send_daily_summary(
    documents: &Documents,
    config: &AppConfig,
    provider: Option<&dyn EmailProvider>,
    on: NaiveDate,
) -> Result<DailySummarySent, NotifyError> {
    let profile = documents
        .cat_profile(&config.cat_id)
        .await?
        .ok_or_else(|| {
            NotifyError::NoDietPlan(format!("no cat profile stored for '{}'", config.cat_id))
        })?;
    let plan = profile
        .diet
        .clone()
        .filter(babbu_feeder_model::DietPlan::has_meals)
        .ok_or_else(|| {
            NotifyError::NoDietPlan(format!(
                "profile '{}' has no diet plan with meals",
                profile.display_name()
            ))
        })?;

    let provider = provider
        .ok_or_else(|| NotifyError::Config("EMAIL_API_KEY is not set".to_string()))?;
    let from = config
        .email_from
        .clone()
        .ok_or_else(|| NotifyError::Config("EMAIL_FROM is not set".to_string()))?;
    if config.recipients.is_empty() {
        return Err(NotifyError::Config(
            "DAILY_EMAIL_RECIPIENTS is not set".to_string(),
        ));
    }

    let message = OutboundEmail {
        from,
        to: config.recipients.clone(),
        subject: render::daily_email_subject(&profile, on),
        html: render::daily_email_html(&profile, &plan, on),
    };
    provider.send(&message).await.map_err(NotifyError::Delivery)?;
    info!(
        cat_id = %config.cat_id,
        recipients = message.to.len(),
        provider = provider.provider_tag(),
        "daily diet summary dispatched"
    );
    Ok(DailySummarySent {
        recipients: message.to.len(),
    })
}

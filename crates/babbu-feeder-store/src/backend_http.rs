// SPDX-License-Identifier: Apache-2.0

use crate::retry::RetryPolicy;
use crate::{Document, DocumentStore, StoreError, StoreErrorCode};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Object-storage backend speaking plain HTTP to a bucket endpoint.
///
/// Objects live at `{base_url}/{bucket}/{object_path}`; the default base
/// points at Google Cloud Storage's XML/path API, and emulators or test
/// servers substitute their own base. Reads and writes carry an optional
/// bearer credential and retry transient failures with linear backoff.
pub struct HttpBucketBackend {
    base_url: String,
    bucket: String,
    auth_bearer: Option<String>,
    retry: RetryPolicy,
}

impl HttpBucketBackend {
    #[must_use]
    pub fn new(
        base_url: String,
        bucket: String,
        auth_bearer: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            auth_bearer: auth_bearer.filter(|t| !t.is_empty()),
            retry,
        }
    }

    fn object_url(&self, document: Document) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, document.object_path())
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                StoreError::new(StoreErrorCode::Config, format!("invalid auth header: {e}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn status_error(status: StatusCode, url: &str) -> StoreError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            StoreError::new(
                StoreErrorCode::Unauthorized,
                format!("bucket rejected credential status={status} url={url}"),
            )
        } else {
            StoreError::new(
                StoreErrorCode::Network,
                format!("bucket request failed status={status} url={url}"),
            )
        }
    }

    fn retryable(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }

    #[instrument(name = "store_http_get_with_retry", skip(self))]
    async fn get_with_retry(&self, url: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let client = self.client();
        let headers = self.auth_headers()?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let req = client.get(url).headers(headers.clone());
            match req.send().await {
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => return Ok(None),
                Ok(resp) if resp.status().is_success() => {
                    return resp.bytes().await.map(|b| Some(b.to_vec())).map_err(|e| {
                        StoreError::new(StoreErrorCode::Network, format!("read body failed: {e}"))
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    if !Self::retryable(status) || attempt >= self.retry.max_attempts {
                        return Err(Self::status_error(status, url));
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(StoreError::new(
                            StoreErrorCode::Network,
                            format!("bucket unreachable url={url}: {e}"),
                        ));
                    }
                }
            }
            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
        }
    }

    #[instrument(name = "store_http_put_with_retry", skip(self, body))]
    async fn put_with_retry(&self, url: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let client = self.client();
        let headers = self.auth_headers()?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let req = client
                .put(url)
                .headers(headers.clone())
                .header("content-type", "application/json")
                .body(body.clone());
            match req.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    let status = resp.status();
                    if !Self::retryable(status) || attempt >= self.retry.max_attempts {
                        return Err(Self::status_error(status, url));
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(StoreError::new(
                            StoreErrorCode::Network,
                            format!("bucket unreachable url={url}: {e}"),
                        ));
                    }
                }
            }
            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
        }
    }
}

#[async_trait]
impl DocumentStore for HttpBucketBackend {
    fn backend_tag(&self) -> &'static str {
        "http_bucket"
    }

    async fn load(&self, document: Document) -> Result<Option<Value>, StoreError> {
        let url = self.object_url(document);
        let Some(bytes) = self.get_with_retry(&url).await? else {
            debug!(document = %document, "document not yet written");
            return Ok(None);
        };
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Validation,
                format!("stored document {document} is not valid JSON: {e}"),
            )
        })?;
        Ok(Some(value))
    }

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
        let url = self.object_url(document);
        let body = serde_json::to_vec(value).map_err(|e| {
            StoreError::new(StoreErrorCode::Internal, format!("serialize failed: {e}"))
        })?;
        self.put_with_retry(&url, body).await?;
        debug!(document = %document, "document saved");
        Ok(())
    }
}

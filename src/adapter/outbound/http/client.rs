//! Resilient JSON-over-HTTP GET client.

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::retry::{is_retryable_error, is_retryable_status, parse_retry_after, RetryPolicy};
use super::settings::HttpConfig;
use crate::error::FetchError;

/// Longest body excerpt carried by a status error.
pub const BODY_PREVIEW_CHARS: usize = 256;

/// Shared GET client for exchange feeds.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: HttpClient,
    timeout: Duration,
    policy: RetryPolicy,
}

struct AttemptFailure {
    error: FetchError,
    retryable: bool,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            retryable: is_retryable_error(&err),
            error: FetchError::Transport(err),
            retry_after: None,
        }
    }

    fn fatal(error: FetchError) -> Self {
        Self {
            error,
            retryable: false,
            retry_after: None,
        }
    }
}

impl FetchClient {
    /// # Errors
    /// Returns [`FetchError::Transport`] when the underlying client cannot be
    /// built, e.g. for a user agent that is not a valid header value.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            http,
            timeout: config.timeout(),
            policy: RetryPolicy::from_config(config),
        })
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` with `query` and decode the body as JSON.
    ///
    /// An empty body decodes to [`Value::Null`]. Transient failures are retried
    /// per the configured [`RetryPolicy`]; the last failure is returned once
    /// retries are exhausted.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.attempt(url, query).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            if !failure.retryable || attempt >= self.policy.retries {
                return Err(failure.error);
            }

            let delay = failure
                .retry_after
                .unwrap_or_else(|| self.policy.backoff(attempt));
            warn!(
                url,
                attempt = attempt + 1,
                max_retries = self.policy.retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure.error,
                "HTTP request failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// [`FetchClient::get`] followed by typed decoding.
    pub async fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let value = self.get(url, query).await?;
        serde_json::from_value(value).map_err(FetchError::Decode)
    }

    async fn attempt(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, AttemptFailure> {
        let response = self
            .http
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(AttemptFailure::transport)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| parse_retry_after(v, Utc::now()));
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure {
                error: FetchError::Status {
                    status,
                    body: preview_body(&body),
                },
                retryable: is_retryable_status(status),
                retry_after,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = response.bytes().await.map_err(AttemptFailure::transport)?;
        debug!(url, status, bytes = body.len(), "HTTP response received");

        decode_body(&content_type, &body).map_err(AttemptFailure::fatal)
    }
}

/// Decode a 2xx body, rejecting HTML or plain-text error pages.
pub fn decode_body(content_type: &str, body: &[u8]) -> Result<Value, FetchError> {
    let first = body.iter().copied().find(|b| !b.is_ascii_whitespace());
    let Some(first) = first else {
        return Ok(Value::Null);
    };

    if !content_type.contains("json") && first != b'{' && first != b'[' {
        return Err(FetchError::UnexpectedContent {
            content_type: if content_type.is_empty() {
                "<none>".to_string()
            } else {
                content_type.to_string()
            },
        });
    }

    serde_json::from_slice(body).map_err(FetchError::Decode)
}

/// Truncate a response body to [`BODY_PREVIEW_CHARS`] characters.
#[must_use]
pub fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

//! Retry classification and backoff.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::settings::HttpConfig;

/// Bounded exponential backoff with 50% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            retries: config.retries,
            backoff_min: config.backoff_min(),
            backoff_max: config.backoff_max(),
        }
    }

    /// Un-jittered delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_min
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }

    /// Jittered delay: `base/2 + random(0, base/2)`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let half = base / 2;
        let half_ms = u64::try_from(half.as_millis()).unwrap_or(u64::MAX);
        if half_ms == 0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0..=half_ms);
        half + Duration::from_millis(jitter)
    }
}

/// 429 and every 5xx are transient; other statuses are final.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status == 429 || matches!(status, 500..=599)
}

/// Timeouts, refused/reset connections and failed sends are transient.
#[must_use]
pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Parse a `Retry-After` value given as delta-seconds or an HTTP-date.
///
/// Dates in the past yield a zero delay.
#[must_use]
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

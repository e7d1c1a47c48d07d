//! Retry wrapper for rate-limited requests.
//!
//! Retries on HTTP 429 and on transport faults with jittered exponential
//! backoff. Every other response, failing or not, is handed back as-is.

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::config::RetryConfig;
use crate::error::{AnalysisError, PipelineResult};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Jittered exponential backoff with a capped attempt count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_jitter_ms: config.max_jitter_ms,
        }
    }
}

impl BackoffPolicy {
    /// Delay after failed attempt `attempt` (0-indexed), given a jitter draw.
    ///
    /// `base_delay * 2^attempt + jitter`, with no upper cap.
    pub fn delay_with_jitter(&self, attempt: u32, jitter_ms: u64) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(exp.saturating_add(jitter_ms))
    }

    /// Delay after failed attempt `attempt`, drawing jitter from `[0, max_jitter)`.
    pub fn delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..self.max_jitter_ms)
        };
        self.delay_with_jitter(attempt, jitter)
    }
}

/// Wraps a `Transport`, retrying rate-limited requests.
#[derive(Clone)]
pub struct RetryingTransport {
    inner: Arc<dyn Transport>,
    policy: BackoffPolicy,
}

impl RetryingTransport {
    pub fn new(inner: Arc<dyn Transport>, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }

    /// Send `request`, returning the first response that is not a 429.
    ///
    /// Fails with `TransportExhausted` once `max_attempts` sends have all been
    /// rate-limited or faulted.
    pub async fn send(&self, request: &HttpRequest) -> PipelineResult<HttpResponse> {
        let max_attempts = self.policy.max_attempts;
        let mut last_failure = String::from("no attempts made");

        for attempt in 0..max_attempts {
            match self.inner.post_json(request).await {
                Ok(resp) if !resp.is_rate_limited() => return Ok(resp),
                Ok(resp) => {
                    last_failure = format!("HTTP {}: rate limited", resp.status);
                }
                Err(fault) => {
                    last_failure = fault.to_string();
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.policy.delay(attempt, &mut rand::thread_rng());
                tracing::warn!(
                    "Attempt {}/{max_attempts} failed ({last_failure}), retrying in {delay:?}",
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!("Giving up after {max_attempts} attempts: {last_failure}");
        Err(AnalysisError::TransportExhausted {
            attempts: max_attempts,
            last_failure,
        })
    }
}

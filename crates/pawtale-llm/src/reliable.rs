use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use pawtale_core::errors::GatewayError;

use crate::provider::{LlmProvider, Prompt};

/// Retry policy for transient backend failures.
#[derive(Clone, Debug)]
pub struct ReliableConfig {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReliableConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Wraps an [`LlmProvider`] with exponential-backoff retries.
///
/// Only transient errors (network, timeout) are retried. Every other error,
/// including malformed replies, propagates on the first attempt.
pub struct ReliableProvider<P: LlmProvider> {
    inner: P,
    config: ReliableConfig,
    total_retries: Arc<AtomicU64>,
}

impl<P: LlmProvider> ReliableProvider<P> {
    pub fn new(inner: P, config: ReliableConfig) -> Self {
        Self {
            inner,
            config,
            total_retries: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_defaults(inner: P) -> Self {
        Self::new(inner, ReliableConfig::default())
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// `base * 2^attempt`, capped at `max_delay`.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .config
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.config.max_delay)
    }

    pub fn total_retries(&self) -> u64 {
        self.total_retries.load(Ordering::Relaxed)
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() || attempt + 1 >= max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.retry_delay(attempt);
                    self.total_retries.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for ReliableProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate_structured(
        &self,
        prompt: &Prompt,
        schema: &Value,
    ) -> Result<Value, GatewayError> {
        self.with_retry("generate_structured", || {
            self.inner.generate_structured(prompt, schema)
        })
        .await
    }

    async fn complete_text(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        self.with_retry("complete_text", || self.inner.complete_text(prompt))
            .await
    }
}

//! Bounded-retry wrapper with exponential backoff.
//!
//! State machine per invocation: `Attempting(n)` transitions to `Succeeded`,
//! `NotFound`, `Attempting(n+1)` (after a backoff wait), or `Exhausted`. The
//! attempt counter is local to each call, so one lookup never inherits retry
//! state from another.

use std::time::Duration;

use stockpilot_core::ProductId;

use crate::client::RawCatalogClient;
use crate::error::CatalogError;
use crate::snapshot::ProductSnapshot;

/// Retry policy configuration.
///
/// Defaults reproduce the sequence 100ms, 200ms, 400ms... capped at 1s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one. Minimum 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per retry.
    pub base_delay: Duration,
    /// Cap applied to both computed backoff and server retry-after hints.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Read overrides from `CATALOG_RETRY_MAX_ATTEMPTS`,
    /// `CATALOG_RETRY_BASE_DELAY_MS`, and `CATALOG_RETRY_MAX_DELAY_MS`;
    /// unset or unparseable values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup_u64 = |key: &str| -> Option<u64> { lookup(key)?.parse().ok() };

        let mut config = Self::default();
        if let Some(n) = lookup_u64("CATALOG_RETRY_MAX_ATTEMPTS") {
            config.max_attempts = (n as u32).max(1);
        }
        if let Some(ms) = lookup_u64("CATALOG_RETRY_BASE_DELAY_MS") {
            config.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = lookup_u64("CATALOG_RETRY_MAX_DELAY_MS") {
            config.max_delay = Duration::from_millis(ms);
        }
        config
    }

    /// Backoff delay after failed attempt `n` (1-based):
    /// `min(base_delay * 2^(n-1), max_delay)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }

    /// Wait to apply after failed attempt `n`, honoring a server hint when
    /// present. Both branches respect `max_delay`.
    fn wait_after(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(retry_after) => retry_after.min(self.max_delay),
            None => self.delay_for_attempt(attempt),
        }
    }
}

/// Wraps a [`RawCatalogClient`] so transient failures become either an
/// eventual success or a terminated [`CatalogError::Unavailable`], without
/// leaking retry mechanics to callers.
#[derive(Debug)]
pub struct ResilientCatalogLookup<C> {
    client: C,
    config: RetryConfig,
}

impl<C> ResilientCatalogLookup<C>
where
    C: RawCatalogClient,
{
    pub fn new(client: C) -> Self {
        Self::with_config(client, RetryConfig::default())
    }

    pub fn with_config(client: C, config: RetryConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Fetch a product, retrying transient failures.
    ///
    /// - `Ok(Some(_))` — the catalog found the product.
    /// - `Ok(None)` — definitive not-found; never retried.
    /// - `Err(Unavailable)` — the retry budget ran out.
    ///
    /// Only the calling task is suspended during backoff waits; the
    /// caller-visible latency bound is one round trip plus the sum of delays.
    pub async fn fetch(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, CatalogError> {
        let mut attempt = 1u32;

        loop {
            match self.client.fetch(product_id).await {
                Ok(found) => return Ok(found),
                Err(failure) => {
                    if attempt >= self.config.max_attempts {
                        tracing::error!(
                            %product_id,
                            attempts = attempt,
                            error = %failure.message,
                            "catalog retry budget exhausted"
                        );
                        return Err(CatalogError::Unavailable {
                            attempts: attempt,
                            message: failure.message,
                        });
                    }

                    let wait = self.config.wait_after(attempt, failure.retry_after);
                    tracing::warn!(
                        %product_id,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %failure.message,
                        "catalog fetch failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}

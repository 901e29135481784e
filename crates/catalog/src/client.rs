//! Raw catalog client seam.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use stockpilot_core::ProductId;

use crate::snapshot::ProductSnapshot;

/// A remote-call outcome expected to succeed if retried (timeouts, 5xx-class
/// responses). Definitive not-found is **not** a failure; it travels as
/// `Ok(None)` on the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransientFailure {
    pub message: String,
    /// Server-specified wait before the next attempt, if it sent one.
    pub retry_after: Option<Duration>,
}

impl TransientFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

/// Single "fetch product by id" call against the catalog service.
///
/// Implementations perform exactly one round trip per call; retrying is the
/// caller's concern (see [`crate::ResilientCatalogLookup`]).
#[async_trait]
pub trait RawCatalogClient: Send + Sync {
    async fn fetch(&self, product_id: ProductId)
    -> Result<Option<ProductSnapshot>, TransientFailure>;
}

#[async_trait]
impl<C> RawCatalogClient for &C
where
    C: RawCatalogClient + ?Sized,
{
    async fn fetch(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, TransientFailure> {
        (**self).fetch(product_id).await
    }
}

#[async_trait]
impl<C> RawCatalogClient for std::sync::Arc<C>
where
    C: RawCatalogClient + ?Sized,
{
    async fn fetch(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, TransientFailure> {
        (**self).fetch(product_id).await
    }
}

//! Stock persistence seam.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use stockpilot_core::{DomainError, ProductId};

use crate::record::StockRecord;

/// Storage-layer fault. Not part of the domain taxonomy; the ledger
/// propagates it unchanged as [`DomainError::Storage`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::storage(err.to_string())
    }
}

/// Durable record store for stock counts, keyed by product id.
///
/// Implementations must be transactionally consistent per key; cross-key
/// atomicity is never required. Per-product serialization of the
/// read-compare-write span is the ledger's job, not the store's.
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StoreError>;

    /// Insert or overwrite the record for its product id.
    async fn upsert(&self, record: StockRecord) -> Result<StockRecord, StoreError>;
}

#[async_trait]
impl<S> StockStore for &S
where
    S: StockStore + ?Sized,
{
    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StoreError> {
        (**self).get(product_id).await
    }

    async fn upsert(&self, record: StockRecord) -> Result<StockRecord, StoreError> {
        (**self).upsert(record).await
    }
}

#[async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StoreError> {
        (**self).get(product_id).await
    }

    async fn upsert(&self, record: StockRecord) -> Result<StockRecord, StoreError> {
        (**self).upsert(record).await
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    records: RwLock<HashMap<ProductId, i64>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("record map poisoned".to_string()))?;

        Ok(records
            .get(&product_id)
            .map(|&quantity| StockRecord::new(product_id, quantity)))
    }

    async fn upsert(&self, record: StockRecord) -> Result<StockRecord, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("record map poisoned".to_string()))?;

        records.insert(record.product_id, record.quantity);
        Ok(record)
    }
}

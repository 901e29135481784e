//! Per-product locking.
//!
//! A partitioned lock keyed by product id: operations on the same product are
//! serialized across their read-compare-write span, operations on different
//! products never contend. The map itself is only locked long enough to hand
//! out the per-key mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use stockpilot_core::ProductId;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<ProductId, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for one product id.
    ///
    /// Suspends the calling task until the holder releases it.
    pub async fn acquire(&self, product_id: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                // A panic while holding the map lock leaves the map intact;
                // keep handing out per-key locks.
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(locks.entry(product_id).or_default())
        };

        lock.lock_owned().await
    }
}

//! The inventory-purchase orchestration workflow.

use chrono::Utc;

use stockpilot_catalog::{ProductSnapshot, RawCatalogClient, ResilientCatalogLookup};
use stockpilot_core::{DomainError, DomainResult, ProductId, ensure_non_negative, ensure_positive};
use stockpilot_events::{NotificationSink, StockChanged};

use crate::locks::KeyedLocks;
use crate::record::{EnrichedStock, PurchaseOutcome, StockRecord};
use crate::store::StockStore;

const PURCHASE_CONFIRMATION: &str = "purchase completed successfully";

/// Single authority for reading and atomically mutating a product's stock
/// quantity, gated by remote product existence.
///
/// Mutating operations check the catalog **before** touching local state, so
/// an unknown product fails as [`DomainError::ProductNotFound`] without a
/// store round trip. The read-compare-write span of `purchase` and
/// `update_quantity` runs under a per-product lock; operations on different
/// products proceed independently.
pub struct StockLedger<S, C, N> {
    store: S,
    catalog: ResilientCatalogLookup<C>,
    sink: N,
    locks: KeyedLocks,
}

impl<S, C, N> StockLedger<S, C, N>
where
    S: StockStore,
    C: RawCatalogClient,
    N: NotificationSink,
{
    pub fn new(store: S, catalog: ResilientCatalogLookup<C>, sink: N) -> Self {
        Self {
            store,
            catalog,
            sink,
            locks: KeyedLocks::new(),
        }
    }

    /// Merged view: local quantity plus remote name/description/price.
    ///
    /// The local existence check runs first, so a missing record never
    /// triggers a wasted remote call.
    pub async fn get_enriched(&self, product_id: ProductId) -> DomainResult<EnrichedStock> {
        let record = self
            .store
            .get(product_id)
            .await?
            .ok_or(DomainError::StockNotFound(product_id))?;

        let product = self.require_product(product_id).await?;

        Ok(EnrichedStock {
            product_id,
            name: product.name,
            description: product.description,
            unit_price: product.unit_price,
            quantity: record.quantity,
        })
    }

    /// Create the stock record for a product, or overwrite it if it already
    /// exists (re-initialization is idempotent-by-overwrite, not rejected).
    ///
    /// Raises no notification.
    pub async fn initialize(
        &self,
        product_id: ProductId,
        initial_quantity: i64,
    ) -> DomainResult<StockRecord> {
        let initial_quantity = ensure_non_negative(initial_quantity)?;
        self.require_product(product_id).await?;

        let _guard = self.locks.acquire(product_id).await;
        let record = self
            .store
            .upsert(StockRecord::new(product_id, initial_quantity))
            .await?;

        tracing::info!(%product_id, quantity = initial_quantity, "stock initialized");
        Ok(record)
    }

    /// Overwrite the stored quantity for an already-initialized product.
    ///
    /// An update is not an implicit initialization: a missing record fails
    /// with [`DomainError::StockNotFound`].
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> DomainResult<StockRecord> {
        let new_quantity = ensure_non_negative(new_quantity)?;
        self.require_product(product_id).await?;

        let _guard = self.locks.acquire(product_id).await;

        let current = self
            .store
            .get(product_id)
            .await?
            .ok_or(DomainError::StockNotFound(product_id))?;

        let record = self
            .store
            .upsert(StockRecord::new(product_id, new_quantity))
            .await?;

        self.notify(StockChanged::new(product_id, current.quantity, new_quantity));
        Ok(record)
    }

    /// The guarded purchase workflow: fetch the remote product, check
    /// availability against the stored quantity, decrement, notify.
    ///
    /// [`DomainError::InsufficientStock`] guarantees no mutation occurred.
    pub async fn purchase(
        &self,
        product_id: ProductId,
        quantity_requested: i64,
    ) -> DomainResult<PurchaseOutcome> {
        let quantity_requested = ensure_positive(quantity_requested)?;
        let product = self.require_product(product_id).await?;

        let _guard = self.locks.acquire(product_id).await;

        let record = self
            .store
            .get(product_id)
            .await?
            .ok_or(DomainError::StockNotFound(product_id))?;

        if record.quantity < quantity_requested {
            return Err(DomainError::InsufficientStock {
                product_id,
                available: record.quantity,
                requested: quantity_requested,
            });
        }

        let new_quantity = record.quantity - quantity_requested;
        self.store
            .upsert(StockRecord::new(product_id, new_quantity))
            .await?;

        self.notify(StockChanged::new(product_id, record.quantity, new_quantity));

        tracing::info!(
            %product_id,
            quantity = quantity_requested,
            remaining = new_quantity,
            "purchase completed"
        );

        Ok(PurchaseOutcome {
            product_id,
            name: product.name,
            unit_price: product.unit_price,
            quantity_purchased: quantity_requested,
            total_due: product.unit_price * quantity_requested as f64,
            purchased_at: Utc::now(),
            message: PURCHASE_CONFIRMATION.to_string(),
        })
    }

    /// The remote-existence guard shared by every mutating operation: fetch
    /// the product through the retry policy, treating definitive absence as
    /// [`DomainError::ProductNotFound`].
    async fn require_product(&self, product_id: ProductId) -> DomainResult<ProductSnapshot> {
        self.catalog
            .fetch(product_id)
            .await
            .map_err(DomainError::from)?
            .ok_or(DomainError::ProductNotFound(product_id))
    }

    /// Fire-and-forget: a failing sink never fails the mutation.
    fn notify(&self, notification: StockChanged) {
        if let Err(err) = self.sink.publish(notification) {
            tracing::warn!(
                product_id = %notification.product_id,
                error = ?err,
                "failed to publish stock change notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use stockpilot_catalog::{RetryConfig, TransientFailure};

    use crate::store::{InMemoryStockStore, StoreError};

    use super::*;

    /// Client with a fixed catalog: known ids resolve, everything else is a
    /// definitive not-found. Counts calls so tests can assert check ordering.
    struct FixedCatalog {
        products: Vec<ProductSnapshot>,
        calls: AtomicU32,
    }

    impl FixedCatalog {
        fn with_laptop() -> Self {
            Self {
                products: vec![ProductSnapshot {
                    id: ProductId::new(1),
                    name: "Laptop".to_string(),
                    description: "13-inch ultrabook".to_string(),
                    unit_price: 1_500_000.0,
                }],
                calls: AtomicU32::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                products: Vec::new(),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RawCatalogClient for FixedCatalog {
        async fn fetch(
            &self,
            product_id: ProductId,
        ) -> Result<Option<ProductSnapshot>, TransientFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.iter().find(|p| p.id == product_id).cloned())
        }
    }

    /// Client that is permanently down.
    struct DownCatalog;

    #[async_trait]
    impl RawCatalogClient for DownCatalog {
        async fn fetch(
            &self,
            _product_id: ProductId,
        ) -> Result<Option<ProductSnapshot>, TransientFailure> {
            Err(TransientFailure::new("connection refused"))
        }
    }

    /// Store wrapper that counts reads, to prove ordering of the guards.
    struct CountingStore<S> {
        inner: S,
        gets: AtomicU32,
    }

    impl<S> CountingStore<S> {
        fn new(inner: S) -> Self {
            Self {
                inner,
                gets: AtomicU32::new(0),
            }
        }

        fn gets(&self) -> u32 {
            self.gets.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<S: StockStore> StockStore for CountingStore<S> {
        async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StoreError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(product_id).await
        }

        async fn upsert(&self, record: StockRecord) -> Result<StockRecord, StoreError> {
            self.inner.upsert(record).await
        }
    }

    /// Sink that records everything it is given.
    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<StockChanged>>,
    }

    impl RecordingSink {
        fn seen(&self) -> Vec<StockChanged> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        type Error = core::convert::Infallible;

        fn publish(&self, notification: StockChanged) -> Result<(), Self::Error> {
            self.seen.lock().unwrap().push(notification);
            Ok(())
        }
    }

    /// Sink that always fails delivery.
    struct BrokenSink;

    impl NotificationSink for BrokenSink {
        type Error = &'static str;

        fn publish(&self, _notification: StockChanged) -> Result<(), Self::Error> {
            Err("sink offline")
        }
    }

    fn fast_lookup<C: RawCatalogClient>(client: C) -> ResilientCatalogLookup<C> {
        ResilientCatalogLookup::with_config(
            client,
            RetryConfig::default()
                .with_base_delay(std::time::Duration::from_millis(1))
                .with_max_delay(std::time::Duration::from_millis(2)),
        )
    }

    async fn seeded_store(product_id: u64, quantity: i64) -> InMemoryStockStore {
        let store = InMemoryStockStore::new();
        store
            .upsert(StockRecord::new(ProductId::new(product_id), quantity))
            .await
            .unwrap();
        store
    }

    fn laptop_id() -> ProductId {
        ProductId::new(1)
    }

    #[tokio::test]
    async fn purchase_decrements_stock_and_prices_the_order() {
        let store = seeded_store(1, 10).await;
        let sink = RecordingSink::default();
        let ledger = StockLedger::new(&store, fast_lookup(FixedCatalog::with_laptop()), &sink);

        let outcome = ledger.purchase(laptop_id(), 5).await.unwrap();

        assert_eq!(outcome.product_id, laptop_id());
        assert_eq!(outcome.name, "Laptop");
        assert_eq!(outcome.unit_price, 1_500_000.0);
        assert_eq!(outcome.quantity_purchased, 5);
        assert_eq!(outcome.total_due, 7_500_000.0);
        assert_eq!(outcome.message, PURCHASE_CONFIRMATION);

        assert_eq!(store.get(laptop_id()).await.unwrap().unwrap().quantity, 5);
        assert_eq!(sink.seen(), vec![StockChanged::new(laptop_id(), 10, 5)]);
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_state_untouched() {
        let store = seeded_store(1, 10).await;
        let sink = RecordingSink::default();
        let ledger = StockLedger::new(&store, fast_lookup(FixedCatalog::with_laptop()), &sink);

        let err = ledger.purchase(laptop_id(), 15).await.unwrap_err();

        assert_eq!(
            err,
            DomainError::InsufficientStock {
                product_id: laptop_id(),
                available: 10,
                requested: 15,
            }
        );
        assert_eq!(store.get(laptop_id()).await.unwrap().unwrap().quantity, 10);
        assert!(sink.seen().is_empty());
    }

    #[tokio::test]
    async fn purchase_requires_prior_initialization() {
        let catalog = FixedCatalog {
            products: vec![ProductSnapshot {
                id: ProductId::new(2),
                name: "Mouse".to_string(),
                description: "wireless".to_string(),
                unit_price: 25_000.0,
            }],
            calls: AtomicU32::new(0),
        };
        let store = InMemoryStockStore::new();
        let ledger = StockLedger::new(&store, fast_lookup(catalog), RecordingSink::default());

        let err = ledger.purchase(ProductId::new(2), 1).await.unwrap_err();
        assert_eq!(err, DomainError::StockNotFound(ProductId::new(2)));
    }

    #[tokio::test]
    async fn non_positive_purchase_quantities_fail_before_any_io() {
        let catalog = FixedCatalog::with_laptop();
        let store = CountingStore::new(InMemoryStockStore::new());

        {
            let ledger = StockLedger::new(&store, fast_lookup(&catalog), RecordingSink::default());

            for bad in [0, -3] {
                let err = ledger.purchase(laptop_id(), bad).await.unwrap_err();
                assert!(matches!(err, DomainError::InvalidQuantity { .. }));
            }
        }

        assert_eq!(catalog.calls(), 0);
        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn negative_initial_quantity_is_rejected() {
        let store = InMemoryStockStore::new();
        let ledger = StockLedger::new(
            &store,
            fast_lookup(FixedCatalog::with_laptop()),
            RecordingSink::default(),
        );

        let err = ledger.initialize(laptop_id(), -1).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidQuantity { quantity: -1, .. }
        ));
        assert_eq!(store.get(laptop_id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn initialize_creates_then_overwrites() {
        let catalog = FixedCatalog {
            products: vec![ProductSnapshot {
                id: ProductId::new(3),
                name: "Keyboard".to_string(),
                description: "mechanical".to_string(),
                unit_price: 90_000.0,
            }],
            calls: AtomicU32::new(0),
        };
        let store = InMemoryStockStore::new();
        let sink = RecordingSink::default();
        let ledger = StockLedger::new(&store, fast_lookup(catalog), &sink);
        let id = ProductId::new(3);

        let created = ledger.initialize(id, 20).await.unwrap();
        assert_eq!(created, StockRecord::new(id, 20));

        let overwritten = ledger.initialize(id, 5).await.unwrap();
        assert_eq!(overwritten, StockRecord::new(id, 5));
        assert_eq!(store.get(id).await.unwrap().unwrap().quantity, 5);

        // Initialization is not a stock *change*; nothing is raised.
        assert!(sink.seen().is_empty());
    }

    #[tokio::test]
    async fn remote_check_wins_over_local_not_found() {
        // Both checks would fail; the remote one must run first and the
        // store must never be queried.
        let store = CountingStore::new(InMemoryStockStore::new());

        {
            let ledger = StockLedger::new(
                &store,
                fast_lookup(FixedCatalog::empty()),
                RecordingSink::default(),
            );
            let id = ProductId::new(9);

            let err = ledger.purchase(id, 1).await.unwrap_err();
            assert_eq!(err, DomainError::ProductNotFound(id));

            let err = ledger.update_quantity(id, 4).await.unwrap_err();
            assert_eq!(err, DomainError::ProductNotFound(id));

            let err = ledger.initialize(id, 4).await.unwrap_err();
            assert_eq!(err, DomainError::ProductNotFound(id));
        }

        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn get_enriched_checks_local_record_first() {
        let catalog = FixedCatalog::with_laptop();
        let store = InMemoryStockStore::new();

        {
            let ledger = StockLedger::new(&store, fast_lookup(&catalog), RecordingSink::default());

            let err = ledger.get_enriched(laptop_id()).await.unwrap_err();
            assert_eq!(err, DomainError::StockNotFound(laptop_id()));
        }

        // Missing local record never triggers a remote call.
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn get_enriched_merges_local_and_remote_data() {
        let store = seeded_store(1, 10).await;
        let ledger = StockLedger::new(
            &store,
            fast_lookup(FixedCatalog::with_laptop()),
            RecordingSink::default(),
        );

        let enriched = ledger.get_enriched(laptop_id()).await.unwrap();
        assert_eq!(
            enriched,
            EnrichedStock {
                product_id: laptop_id(),
                name: "Laptop".to_string(),
                description: "13-inch ultrabook".to_string(),
                unit_price: 1_500_000.0,
                quantity: 10,
            }
        );
    }

    #[tokio::test]
    async fn get_enriched_surfaces_remote_absence() {
        let store = seeded_store(9, 4).await;
        let ledger = StockLedger::new(
            &store,
            fast_lookup(FixedCatalog::empty()),
            RecordingSink::default(),
        );

        let err = ledger.get_enriched(ProductId::new(9)).await.unwrap_err();
        assert_eq!(err, DomainError::ProductNotFound(ProductId::new(9)));
    }

    #[tokio::test]
    async fn update_requires_an_existing_record() {
        let store = InMemoryStockStore::new();
        let ledger = StockLedger::new(
            &store,
            fast_lookup(FixedCatalog::with_laptop()),
            RecordingSink::default(),
        );

        let err = ledger.update_quantity(laptop_id(), 7).await.unwrap_err();
        assert_eq!(err, DomainError::StockNotFound(laptop_id()));
    }

    #[tokio::test]
    async fn update_overwrites_and_notifies_with_before_after() {
        let store = seeded_store(1, 10).await;
        let sink = RecordingSink::default();
        let ledger = StockLedger::new(&store, fast_lookup(FixedCatalog::with_laptop()), &sink);

        let record = ledger.update_quantity(laptop_id(), 25).await.unwrap();

        assert_eq!(record, StockRecord::new(laptop_id(), 25));
        assert_eq!(sink.seen(), vec![StockChanged::new(laptop_id(), 10, 25)]);
    }

    #[tokio::test]
    async fn exhausted_catalog_surfaces_remote_unavailable() {
        let store = seeded_store(1, 10).await;
        let ledger = StockLedger::new(&store, fast_lookup(DownCatalog), RecordingSink::default());

        let err = ledger.purchase(laptop_id(), 1).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::RemoteUnavailable { attempts: 3, .. }
        ));
        // No mutation on the way out.
        assert_eq!(store.get(laptop_id()).await.unwrap().unwrap().quantity, 10);
    }

    proptest::proptest! {
        /// For any initial stock and request, a purchase either decrements by
        /// exactly the requested amount (never below zero) or rejects with
        /// `InsufficientStock` and leaves the record untouched.
        #[test]
        fn purchase_never_oversells(initial in 0i64..200, requested in 1i64..200) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();

            rt.block_on(async {
                let store = seeded_store(1, initial).await;
                let ledger = StockLedger::new(
                    &store,
                    fast_lookup(FixedCatalog::with_laptop()),
                    RecordingSink::default(),
                );

                let result = ledger.purchase(laptop_id(), requested).await;
                let after = store.get(laptop_id()).await.unwrap().unwrap().quantity;

                if requested <= initial {
                    let outcome = result.unwrap();
                    assert_eq!(outcome.quantity_purchased, requested);
                    assert_eq!(after, initial - requested);
                    assert!(after >= 0);
                } else {
                    assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));
                    assert_eq!(after, initial);
                }
            });
        }
    }

    #[tokio::test]
    async fn broken_sink_never_fails_the_mutation() {
        let store = seeded_store(1, 10).await;
        let ledger = StockLedger::new(&store, fast_lookup(FixedCatalog::with_laptop()), BrokenSink);

        let outcome = ledger.purchase(laptop_id(), 2).await.unwrap();

        assert_eq!(outcome.quantity_purchased, 2);
        assert_eq!(store.get(laptop_id()).await.unwrap().unwrap().quantity, 8);
    }
}

//! `stockpilot-stock` — per-product stock counts and the purchase workflow.
//!
//! [`StockLedger`] is the single authority for reading and atomically mutating
//! a product's stock quantity, gated by remote product existence. It combines
//! the local [`StockStore`] with the resilient catalog lookup, enforces the
//! non-negativity invariant, and raises a [`stockpilot_events::StockChanged`]
//! notification per successful mutation.

pub mod ledger;
pub mod locks;
pub mod record;
pub mod store;

pub use ledger::StockLedger;
pub use locks::KeyedLocks;
pub use record::{EnrichedStock, PurchaseOutcome, StockRecord};
pub use store::{InMemoryStockStore, StockStore, StoreError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpilot_core::ProductId;

/// The local persisted quantity-on-hand for a product.
///
/// One record per product id; the id is both external identity and local
/// primary key. `quantity >= 0` holds after any successful mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl StockRecord {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Merged view of the local stock record and the remote product data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedStock {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// Produced once per successful purchase; transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: f64,
    pub quantity_purchased: i64,
    pub total_due: f64,
    pub purchased_at: DateTime<Utc>,
    pub message: String,
}

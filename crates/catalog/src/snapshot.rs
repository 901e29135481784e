use serde::{Deserialize, Serialize};

use stockpilot_core::ProductId;

/// Point-in-time view of a product as the catalog service reports it.
///
/// Never cached durably: fetched fresh per operation and treated as
/// authoritative for pricing and identity display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub unit_price: f64,
}

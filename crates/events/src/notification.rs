use serde::{Deserialize, Serialize};

use stockpilot_core::ProductId;

/// Raised exactly once per successful stock mutation (update or purchase).
///
/// Carries the before/after quantities so consumers never need to re-read the
/// store to know what changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChanged {
    pub product_id: ProductId,
    pub previous_quantity: i64,
    pub new_quantity: i64,
}

impl StockChanged {
    pub fn new(product_id: ProductId, previous_quantity: i64, new_quantity: i64) -> Self {
        Self {
            product_id,
            previous_quantity,
            new_quantity,
        }
    }
}

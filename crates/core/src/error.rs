//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// This is the single typed failure surface callers of the stock ledger see.
/// Infrastructure errors that are not modeled here propagate as `Storage`
/// without reinterpretation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Caller supplied a quantity that is out of range for the operation.
    /// Rejected before any I/O happens.
    #[error("invalid quantity {quantity}: {reason}")]
    InvalidQuantity { quantity: i64, reason: &'static str },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// No local stock record exists for the product. Distinct from
    /// `ProductNotFound` so callers can tell "uninitialized stock" from
    /// "unknown product".
    #[error("no stock record for product {0}")]
    StockNotFound(ProductId),

    /// The remote catalog has no such product.
    #[error("product {0} not found in catalog service")]
    ProductNotFound(ProductId),

    /// A purchase asked for more than is on hand. No mutation occurred.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The catalog dependency stayed unavailable through the whole retry
    /// budget. The caller may retry the whole operation later.
    #[error("catalog service unavailable after {attempts} attempts: {message}")]
    RemoteUnavailable { attempts: u32, message: String },

    /// Unmodeled storage-layer fault, propagated unchanged.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn invalid_quantity(quantity: i64, reason: &'static str) -> Self {
        Self::InvalidQuantity { quantity, reason }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

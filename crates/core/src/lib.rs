//! `stockpilot-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the product identifier, the shared error taxonomy, and quantity guards.

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use quantity::{ensure_non_negative, ensure_positive};

//! `stockpilot-catalog` — resilient access to the remote product catalog.
//!
//! The catalog service is the sole authority for product identity, name,
//! description, and price. This crate owns the client seam
//! ([`RawCatalogClient`]), the bounded-retry/backoff policy that makes the
//! remote call tolerable ([`ResilientCatalogLookup`]), and the HTTP
//! implementation of the seam ([`HttpCatalogClient`]).

pub mod client;
pub mod error;
pub mod http;
pub mod retry;
pub mod snapshot;

pub use client::{RawCatalogClient, TransientFailure};
pub use error::CatalogError;
pub use http::{HttpCatalogClient, HttpCatalogConfig};
pub use retry::{ResilientCatalogLookup, RetryConfig};
pub use snapshot::ProductSnapshot;

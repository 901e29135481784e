//! HTTP implementation of the catalog client seam.
//!
//! Speaks to `GET {base_url}/api/products/{id}` with an `X-API-KEY` header on
//! every request. Status mapping:
//!
//! - `2xx` → parsed [`ProductSnapshot`]
//! - `404` → semantic not-found (`Ok(None)`)
//! - anything else, plus transport errors → [`TransientFailure`], carrying the
//!   `Retry-After` header (seconds) when the server sent one

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use stockpilot_core::ProductId;

use crate::client::{RawCatalogClient, TransientFailure};
use crate::snapshot::ProductSnapshot;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Connection settings for the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl HttpCatalogConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Read `CATALOG_SERVICE_URL` and `CATALOG_API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CATALOG_SERVICE_URL").unwrap_or_else(|| {
            tracing::warn!("CATALOG_SERVICE_URL not set; using default service address");
            "http://catalog-service:8080".to_string()
        });
        let api_key = lookup("CATALOG_API_KEY").unwrap_or_else(|| {
            tracing::warn!("CATALOG_API_KEY not set; catalog requests will be unauthenticated");
            String::new()
        });
        Self { base_url, api_key }
    }
}

/// [`RawCatalogClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    config: HttpCatalogConfig,
}

impl HttpCatalogClient {
    pub fn new(config: HttpCatalogConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http_client(http: reqwest::Client, config: HttpCatalogConfig) -> Self {
        Self { http, config }
    }

    fn product_url(&self, product_id: ProductId) -> String {
        format!(
            "{}/api/products/{}",
            self.config.base_url.trim_end_matches('/'),
            product_id
        )
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let seconds: u64 = value.trim().parse().ok()?;
    Some(Duration::from_secs(seconds))
}

#[async_trait]
impl RawCatalogClient for HttpCatalogClient {
    async fn fetch(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, TransientFailure> {
        let response = self
            .http
            .get(self.product_url(product_id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| TransientFailure::new(format!("catalog request failed: {e}")))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status.is_success() {
            let snapshot = response
                .json::<ProductSnapshot>()
                .await
                .map_err(|e| TransientFailure::new(format!("malformed catalog response: {e}")))?;
            return Ok(Some(snapshot));
        }

        let mut failure = TransientFailure::new(format!("catalog returned {status}"));
        failure.retry_after = parse_retry_after(response.headers());
        Err(failure)
    }
}

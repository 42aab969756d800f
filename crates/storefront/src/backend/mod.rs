//! HTTP client for the commerce backend.
//!
//! Catalog and settings responses are cached for a few minutes; checkout is
//! never cached. Bodies are read as text first so a parse failure can be
//! logged with the offending payload.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::catalog::normalize_catalog;
use crate::catalog::types::Product;
use crate::config::ShopSettings;
use types::{
    ApiErrorBody, CheckoutRequest, CheckoutSuccess, OUT_OF_STOCK, RawCatalogItem,
    StockConflictBody, StockConflictEntry,
};

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 8;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("could not reach the shop backend: {0}")]
    Network(#[from] reqwest::Error),

    /// A non-success status, carrying the server's own message when it sent
    /// one.
    #[error("shop backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not parse backend response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A success response missing the field that makes it useful.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

/// Successful outcomes of `POST /checkout`.
#[derive(Debug, Clone)]
pub enum CheckoutApiResponse {
    /// Payment is ready; send the shopper to this URL.
    Redirect(String),
    /// The backend refused the order because stock moved underneath it.
    OutOfStock(Vec<StockConflictEntry>),
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Products,
    Settings,
}

#[derive(Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Settings(ShopSettings),
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

/// Cheaply cloneable backend client.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<Inner>,
}

impl BackendClient {
    /// `base_url` must not end with a slash; [`crate::config`] guarantees
    /// this for configured values.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                base_url: base_url.into(),
                cache: Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// Fetches and normalizes the product catalog. Served from cache when
    /// fresh.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("catalog cache hit");
            return Ok(products);
        }

        let url = format!("{}/products", self.inner.base_url);
        let response = self.inner.http.get(&url).send().await?;
        let body = check_status(response).await?;
        let items: Vec<RawCatalogItem> = serde_json::from_str(&body).inspect_err(|e| {
            warn!(error = %e, "catalog payload did not parse");
        })?;
        let products = normalize_catalog(items);
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetches shop settings, overlaying them onto `defaults`. Served from
    /// cache when fresh.
    #[instrument(skip(self, defaults))]
    pub async fn fetch_settings(
        &self,
        defaults: &ShopSettings,
    ) -> Result<ShopSettings, BackendError> {
        if let Some(CacheValue::Settings(settings)) =
            self.inner.cache.get(&CacheKey::Settings).await
        {
            debug!("settings cache hit");
            return Ok(settings);
        }

        let url = format!("{}/admin/config", self.inner.base_url);
        let response = self.inner.http.get(&url).send().await?;
        let body = check_status(response).await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let settings = ShopSettings::from_value(defaults, &value);
        self.inner
            .cache
            .insert(CacheKey::Settings, CacheValue::Settings(settings.clone()))
            .await;
        Ok(settings)
    }

    /// Submits a checkout. Never cached, never retried.
    #[instrument(skip(self, request), fields(lines = request.cart.len()))]
    pub async fn submit_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutApiResponse, BackendError> {
        let url = format!("{}/checkout", self.inner.base_url);
        let response = self.inner.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::CONFLICT {
            let conflict: StockConflictBody = serde_json::from_str(&body).map_err(|_| {
                status_error(status, &body)
            })?;
            if conflict.kind == OUT_OF_STOCK {
                warn!(conflicts = conflict.conflicts.len(), "checkout rejected for stock");
                return Ok(CheckoutApiResponse::OutOfStock(conflict.conflicts));
            }
            return Err(status_error(status, &body));
        }
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let success: CheckoutSuccess = serde_json::from_str(&body)?;
        match success.checkout_url {
            Some(url) if !url.trim().is_empty() => Ok(CheckoutApiResponse::Redirect(url)),
            _ => Err(BackendError::MalformedResponse(
                "checkout succeeded but no checkout URL was returned".to_owned(),
            )),
        }
    }

    /// Drops all cached responses. Called after a stock conflict so the
    /// next catalog read reflects reality.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
        debug!("backend cache invalidated");
    }
}

async fn check_status(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status, &body))
    }
}

/// Builds a status error, preferring the server's `error` field over the
/// raw body.
fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            } else {
                body.trim().to_owned()
            }
        });
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

//! Engine state: the loaded catalog and the application facade.

use sugarplum_core::Notice;
use tracing::{debug, instrument, warn};

use crate::backend::BackendClient;
use crate::backend::types::CustomerInfo;
use crate::cart::{CartStore, CartTotals, JsonFileStorage};
use crate::catalog::types::{PrintLocation, Product};
use crate::checkout::{self, CheckoutError, CheckoutOutcome};
use crate::config::{ShopSettings, StorefrontConfig};
use crate::error::EngineError;

/// The currently loaded catalog, with load sequencing.
///
/// Loads are ticketed: callers take a ticket before fetching and present it
/// when applying. A response that arrives after a newer load has already
/// applied is discarded, so overlapping reloads can never roll the catalog
/// back to older data.
#[derive(Debug, Default)]
pub struct CatalogState {
    products: Vec<Product>,
    next_ticket: u64,
    applied_ticket: u64,
}

impl CatalogState {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == product_id)
    }

    /// Takes a ticket for a load that is about to start.
    pub fn begin_load(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Applies a completed load. Returns false when a newer load already
    /// applied and this one was discarded.
    pub fn apply_load(&mut self, ticket: u64, products: Vec<Product>) -> bool {
        if ticket <= self.applied_ticket {
            debug!(ticket, applied = self.applied_ticket, "discarding stale catalog load");
            return false;
        }
        self.applied_ticket = ticket;
        self.products = products;
        true
    }
}

/// Everything a storefront frontend needs, behind one facade. Owns the
/// backend client, the catalog, the cart and the effective settings.
pub struct AppState {
    config: StorefrontConfig,
    settings: ShopSettings,
    backend: BackendClient,
    catalog: CatalogState,
    cart: CartStore,
}

impl AppState {
    /// Builds state from the environment. The catalog starts empty; call
    /// [`Self::reload_catalog`] to populate it.
    pub fn init() -> Result<Self, EngineError> {
        let config = StorefrontConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(config.api_base.clone());
        let cart = CartStore::new(Box::new(JsonFileStorage::new(config.cart_path.clone())));
        let settings = config.default_settings.clone();
        Self {
            config,
            settings,
            backend,
            catalog: CatalogState::default(),
            cart,
        }
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn settings(&self) -> &ShopSettings {
        &self.settings
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Fetches and applies the catalog.
    #[instrument(skip(self))]
    pub async fn reload_catalog(&mut self) -> Result<(), EngineError> {
        let ticket = self.catalog.begin_load();
        let products = self.backend.fetch_catalog().await?;
        self.catalog.apply_load(ticket, products);
        Ok(())
    }

    /// Refreshes shop settings. A failed fetch keeps the current settings;
    /// the shop must stay usable on defaults.
    #[instrument(skip(self))]
    pub async fn refresh_settings(&mut self) {
        match self
            .backend
            .fetch_settings(&self.config.default_settings)
            .await
        {
            Ok(settings) => self.settings = settings,
            Err(e) => warn!(error = %e, "settings refresh failed, keeping current settings"),
        }
    }

    /// Adds a selection to the cart by product id.
    pub fn add_to_cart(
        &mut self,
        product_id: &str,
        color: &str,
        size: &str,
        print_location: Option<PrintLocation>,
        quantity: i64,
    ) -> Option<Notice> {
        let Some(product) = self.catalog.find(product_id) else {
            warn!(product_id, "add_to_cart for unknown product");
            return Some(Notice::error("That product is no longer available."));
        };
        let product = product.clone();
        self.cart.add(&product, color, size, print_location, quantity)
    }

    /// Changes a cart line's quantity, clamped against the loaded catalog.
    pub fn set_cart_quantity(&mut self, index: usize, quantity: i64) -> Option<Notice> {
        self.cart
            .set_quantity(index, quantity, &self.catalog.products)
    }

    pub fn totals(&self, region: Option<&str>) -> CartTotals {
        self.cart.totals(&self.settings, region)
    }

    /// Submits checkout for the current cart.
    pub async fn checkout(
        &mut self,
        customer: &CustomerInfo,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        checkout::submit(
            &self.backend,
            &mut self.cart,
            &mut self.catalog,
            customer,
            &self.settings,
        )
        .await
    }
}

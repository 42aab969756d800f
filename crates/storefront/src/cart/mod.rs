//! The shopper's cart: lines, mutations and persistence.
//!
//! Every mutation clamps against known stock, then persists. Clamps that
//! lose quantity the shopper asked for produce a [`Notice`]; hitting a cap
//! that was already reached is a silent no-op.

pub mod storage;
pub mod totals;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sugarplum_core::{Notice, ProductId, VariantId};
use tracing::{debug, warn};

use crate::catalog::resolve::{STOCK_UNKNOWN_CAP, max_available, price_for, resolve};
use crate::catalog::types::{PrintLocation, Product};
use crate::cart::storage::CartStorage;
use crate::config::ShopSettings;

pub use storage::{CART_STORAGE_KEY, JsonFileStorage, MemoryStorage, StorageError};
pub use totals::{CartTotals, free_shipping_message};

/// One line in the cart. Identity is the (product, color, size, print
/// location) tuple; everything else is a snapshot taken at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub kind: String,
    pub color: String,
    pub size: String,
    pub print_location: Option<PrintLocation>,
    /// Unit price in dollars, refreshed whenever the line is touched.
    pub unit_price: Decimal,
    pub quantity: i64,
    pub external_variant_id: Option<VariantId>,
    pub sku: Option<String>,
    pub image: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Identity check for merging: same product and options, with color and
    /// size compared case-insensitively.
    fn same_selection(
        &self,
        product_id: &ProductId,
        color: &str,
        size: &str,
        print_location: Option<PrintLocation>,
    ) -> bool {
        self.product_id == *product_id
            && self.color.eq_ignore_ascii_case(color)
            && self.size.eq_ignore_ascii_case(size)
            && self.print_location == print_location
    }

    /// Short human label for notices, e.g. `"Classic Tee (Red / M)"`.
    fn label(&self) -> String {
        format!("{} ({} / {})", self.product_name, self.color, self.size)
    }
}

/// The cart plus its persistence. Mutations go through this type so nothing
/// ever changes without landing in storage.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Box<dyn CartStorage>,
}

impl CartStore {
    /// Loads whatever the storage holds; corrupt or missing state is an
    /// empty cart.
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        let lines = storage.load();
        debug!(lines = lines.len(), "cart loaded");
        Self { lines, storage }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Order totals for the current lines. Pure; no catalog access.
    pub fn totals(&self, settings: &ShopSettings, region: Option<&str>) -> CartTotals {
        CartTotals::compute(&self.lines, settings, region)
    }

    /// Adds `requested` units of a selection, merging into an existing line
    /// when the selection matches.
    ///
    /// The merged quantity is clamped to the selection's availability. A
    /// clamp that still added something returns a warning notice; a cart
    /// already at the cap changes nothing and stays silent. Non-positive
    /// requests are ignored.
    pub fn add(
        &mut self,
        product: &Product,
        color: &str,
        size: &str,
        print_location: Option<PrintLocation>,
        requested: i64,
    ) -> Option<Notice> {
        if requested <= 0 {
            return None;
        }
        let cap = max_available(product, color, size, print_location);
        let existing = self
            .lines
            .iter()
            .position(|l| l.same_selection(&product.id, color, size, print_location));
        let current = existing
            .and_then(|i| self.lines.get(i))
            .map_or(0, |l| l.quantity);

        let desired = current.saturating_add(requested);
        let clamped = desired.min(cap);
        if clamped <= current {
            debug!(product = %product.id, color, size, "already at stock cap, nothing added");
            return None;
        }

        let resolved = resolve(product, color, size, print_location);
        let unit_price = price_for(product, color, size, print_location);
        if let Some(i) = existing {
            if let Some(line) = self.lines.get_mut(i) {
                line.quantity = clamped;
                line.unit_price = unit_price;
                line.external_variant_id = resolved.and_then(|v| v.external_variant_id.clone());
                line.sku = resolved.and_then(|v| v.sku.clone());
            }
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                kind: product.kind.clone(),
                color: color.trim().to_owned(),
                size: size.trim().to_owned(),
                print_location,
                unit_price,
                quantity: clamped,
                external_variant_id: resolved.and_then(|v| v.external_variant_id.clone()),
                sku: resolved.and_then(|v| v.sku.clone()),
                image: product.image.clone(),
            });
        }
        self.persist();

        (clamped < desired).then(|| {
            let label = existing
                .and_then(|i| self.lines.get(i))
                .or_else(|| self.lines.last())
                .map_or_else(String::new, CartLine::label);
            Notice::warning(format!(
                "Only {cap} in stock for {label}. Your cart has been adjusted."
            ))
        })
    }

    /// Sets an existing line to an exact quantity, re-clamping against the
    /// given catalog. Zero or less removes the line. A line whose product
    /// has left the catalog is not re-clamped.
    pub fn set_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        catalog: &[Product],
    ) -> Option<Notice> {
        if quantity <= 0 {
            return self.remove(index);
        }
        let Some(line) = self.lines.get(index) else {
            warn!(index, "set_quantity on missing cart line");
            return None;
        };

        let cap = catalog
            .iter()
            .find(|p| p.id == line.product_id)
            .map_or(STOCK_UNKNOWN_CAP, |p| {
                max_available(p, &line.color, &line.size, line.print_location)
            });
        let clamped = quantity.min(cap);
        let notice = (clamped < quantity).then(|| {
            Notice::warning(format!(
                "Only {cap} in stock for {}. Quantity set to {clamped}.",
                line.label()
            ))
        });
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = clamped;
        }
        self.persist();
        notice
    }

    /// Removes a line. Out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Notice> {
        if index >= self.lines.len() {
            warn!(index, "remove on missing cart line");
            return None;
        }
        let line = self.lines.remove(index);
        debug!(product = %line.product_id, "removed cart line");
        self.persist();
        None
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sets a line to a server-reported availability, bypassing local stock
    /// knowledge. Used when reconciling a checkout conflict. Returns true
    /// when the line was removed outright.
    pub(crate) fn apply_server_quantity(&mut self, index: usize, available: i64) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        if available <= 0 {
            self.lines.remove(index);
            true
        } else {
            if let Some(line) = self.lines.get_mut(index) {
                line.quantity = line.quantity.min(available);
            }
            false
        }
    }

    pub(crate) fn persist(&self) {
        // A failed write is not worth blocking the shopper over; the cart
        // stays usable in memory and the next mutation retries.
        if let Err(e) = self.storage.save(&self.lines) {
            warn!(error = %e, "failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use sugarplum_core::Severity;

    use super::*;
    use crate::catalog::types::{ProductFlags, Variant};

    fn product_with_stock(qty: Option<i64>) -> Product {
        Product {
            id: ProductId::from("p1"),
            name: "Classic Tee".to_owned(),
            description: String::new(),
            kind: "T-Shirts".to_owned(),
            audience: vec![],
            subcategory: None,
            image: Some("https://img.example/tee.png".to_owned()),
            base_price: Decimal::new(1800, 2),
            colors: vec!["Red".to_owned()],
            sizes: vec!["M".to_owned()],
            print_locations: vec![],
            variants: vec![Variant {
                color: "Red".to_owned(),
                size: "M".to_owned(),
                print_location: None,
                price: Some(Decimal::new(1800, 2)),
                quantity_available: qty,
                external_variant_id: Some(VariantId::from("sq-1")),
                sku: Some("TEE-R-M".to_owned()),
            }],
            aggregate_inventory: qty.unwrap_or(0).max(0),
            inventory_tracked: qty.is_some(),
            flags: ProductFlags::default(),
        }
    }

    fn store() -> CartStore {
        CartStore::new(Box::new(MemoryStorage::default()))
    }

    #[test]
    fn test_add_merges_same_selection() {
        let mut cart = store();
        let p = product_with_stock(Some(10));
        assert!(cart.add(&p, "Red", "M", None, 2).is_none());
        assert!(cart.add(&p, "red", "m", None, 1).is_none());
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].sku.as_deref(), Some("TEE-R-M"));
    }

    #[test]
    fn test_add_clamps_with_notice_then_silent() {
        let mut cart = store();
        let p = product_with_stock(Some(3));
        let notice = cart.add(&p, "Red", "M", None, 5).unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(cart.lines()[0].quantity, 3);
        // Already at the cap: no change, no notice.
        assert!(cart.add(&p, "Red", "M", None, 1).is_none());
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_ignores_non_positive() {
        let mut cart = store();
        let p = product_with_stock(Some(3));
        assert!(cart.add(&p, "Red", "M", None, 0).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_untracked_stock_never_clamps() {
        let mut cart = store();
        let p = product_with_stock(None);
        assert!(cart.add(&p, "Red", "M", None, 250).is_none());
        assert_eq!(cart.lines()[0].quantity, 250);
    }

    #[test]
    fn test_set_quantity_clamps_and_removes() {
        let mut cart = store();
        let p = product_with_stock(Some(4));
        cart.add(&p, "Red", "M", None, 2);
        let catalog = vec![p];
        let notice = cart.set_quantity(0, 9, &catalog).unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(cart.lines()[0].quantity, 4);
        assert!(cart.set_quantity(0, 0, &catalog).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_vanished_product_not_clamped() {
        let mut cart = store();
        let p = product_with_stock(Some(4));
        cart.add(&p, "Red", "M", None, 2);
        assert!(cart.set_quantity(0, 9, &[]).is_none());
        assert_eq!(cart.lines()[0].quantity, 9);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let p = product_with_stock(Some(10));
        {
            let mut cart = CartStore::new(Box::new(JsonFileStorage::in_dir(dir.path())));
            cart.add(&p, "Red", "M", None, 2);
        }
        let reloaded = CartStore::new(Box::new(JsonFileStorage::in_dir(dir.path())));
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.lines()[0].quantity, 2);
        assert_eq!(reloaded.subtotal(), Decimal::new(3600, 2));
    }

    #[test]
    fn test_failed_persist_keeps_cart_usable() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be makes every
        // save fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let storage = JsonFileStorage::new(blocker.join("cart.json"));

        let mut cart = CartStore::new(Box::new(storage));
        let p = product_with_stock(Some(10));
        assert!(cart.add(&p, "Red", "M", None, 2).is_none());
        assert_eq!(cart.lines()[0].quantity, 2);
        assert!(cart.set_quantity(0, 5, &[p]).is_none());
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_clear() {
        let mut cart = store();
        cart.add(&product_with_stock(Some(10)), "Red", "M", None, 2);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }
}

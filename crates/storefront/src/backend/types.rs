//! Wire types for the commerce backend.
//!
//! The backend is a thin wrapper around the Square catalog, and its payloads
//! are loosely shaped: fields come and go between syncs, quantities hide
//! under half a dozen names, and prices arrive as numbers or strings.
//! Everything here is `#[serde(default)]`-tolerant; tightening happens in
//! [`crate::catalog::normalize`].

use serde::{Deserialize, Serialize};

// =============================================================================
// GET /products
// =============================================================================

/// A raw catalog item as returned by `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCatalogItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub audience: Option<Vec<String>>,
    pub subcategory: Option<String>,
    pub image: Option<String>,
    /// Item-level inventory count; only consulted when no variation carries
    /// a usable quantity.
    pub inventory: Option<serde_json::Value>,
    pub variations: Option<Vec<RawVariation>>,
    pub flags: Option<RawFlags>,
}

/// A raw price/stock variation nested under a catalog item.
///
/// Quantity is deliberately NOT a declared field: the backend has shipped it
/// under many names over time, so it stays in `extra` and is read by
/// `normalize::extract_quantity` with a fixed priority list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVariation {
    pub price: Option<serde_json::Value>,
    pub color: Option<String>,
    pub size: Option<String>,
    /// Free-text variation name, e.g. `"Red / M / Front Print"`. Used to
    /// infer the print location when no explicit field is present.
    pub name: Option<String>,
    #[serde(alias = "printLocation", alias = "printSide", alias = "print_side")]
    pub print_location: Option<String>,
    pub id: Option<String>,
    pub sku: Option<String>,
    /// Everything else, including whichever quantity field this sync used.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Display/visibility flags attached to a catalog item by the back office.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFlags {
    pub is_new: bool,
    pub is_featured: bool,
    pub pin_to_top: bool,
    pub hide_online: bool,
    pub hide_kiosk: bool,
    pub ribbon_type: Option<String>,
    pub ribbon_custom_text: Option<String>,
}

// =============================================================================
// POST /checkout
// =============================================================================

/// Customer record attached to a checkout submission.
///
/// Only `name` and `email` are required; the rest ride along when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart: Vec<CheckoutLineItem>,
    pub customer: CustomerInfo,
    /// Client-computed shipping in cents. A hint only - the server is
    /// authoritative and may ignore it.
    pub shipping_total_cents: i64,
}

/// One cart line in transport form. Prices are integer cents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: i64,
    pub quantity: i64,
    pub square_variation_id: Option<String>,
    pub catalog_object_id: Option<String>,
}

/// Success body of `POST /checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSuccess {
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// `409` body reporting lines that can no longer be fulfilled.
#[derive(Debug, Clone, Deserialize)]
pub struct StockConflictBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub conflicts: Vec<StockConflictEntry>,
}

/// One conflicting line as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockConflictEntry {
    pub product_id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub requested_qty: i64,
    pub available_qty: i64,
}

impl Default for StockConflictEntry {
    fn default() -> Self {
        Self {
            product_id: None,
            name: String::new(),
            color: None,
            size: None,
            requested_qty: 0,
            available_qty: 0,
        }
    }
}

/// Generic error body used by non-success statuses other than 409.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub error: Option<String>,
}

/// Discriminator value the backend uses on stock-conflict bodies.
pub const OUT_OF_STOCK: &str = "OUT_OF_STOCK";

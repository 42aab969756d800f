//! Turns raw backend catalog payloads into [`Product`]s.
//!
//! This is where all the tolerance lives: quantity probing across legacy
//! field names, number-or-string price coercion, print-location inference
//! and master-order option sorting. Items missing both an id and a name are
//! dropped with a warning; everything else degrades to a usable product.

use rust_decimal::Decimal;
use serde_json::Value;
use sugarplum_core::{ProductId, VariantId};
use tracing::{debug, warn};

use crate::backend::types::{RawCatalogItem, RawFlags, RawVariation};
use crate::catalog::types::{
    MASTER_COLORS, MASTER_SIZES, PrintLocation, Product, ProductFlags, RibbonType, Variant,
    sort_by_master_order,
};

/// Quantity field names, in priority order. The first present and coercible
/// value wins; later fields are not consulted even if the first is zero.
const QUANTITY_FIELDS: &[&str] = &[
    "availableQty",
    "available_quantity",
    "inventory",
    "quantity",
    "stock",
    "qty",
    "onHand",
    "on_hand",
    "quantityOnHand",
    "quantity_on_hand",
];

/// Fallback option values for items whose variations carry no color or size.
const DEFAULT_COLOR: &str = "Default";
const DEFAULT_SIZE: &str = "Standard";

pub fn normalize_catalog(items: Vec<RawCatalogItem>) -> Vec<Product> {
    let total = items.len();
    let products: Vec<Product> = items.into_iter().filter_map(normalize_item).collect();
    debug!(total, kept = products.len(), "normalized catalog");
    products
}

fn normalize_item(item: RawCatalogItem) -> Option<Product> {
    let id = match (item.id, &item.name) {
        (Some(id), _) => ProductId::from(id),
        // Older syncs omitted ids; the name is stable enough to key on.
        (None, Some(name)) if !name.trim().is_empty() => ProductId::new(name.trim()),
        (None, _) => {
            warn!("dropping catalog item with neither id nor name");
            return None;
        }
    };
    let name = item
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| id.as_str().to_owned());

    let raw_variations = item.variations.unwrap_or_default();
    let variants: Vec<Variant> = raw_variations.into_iter().map(normalize_variation).collect();

    let mut colors = distinct(variants.iter().filter_map(|v| non_empty(&v.color)));
    let mut sizes = distinct(variants.iter().filter_map(|v| non_empty(&v.size)));
    sort_by_master_order(&mut colors, MASTER_COLORS);
    sort_by_master_order(&mut sizes, MASTER_SIZES);
    if colors.is_empty() {
        colors.push(DEFAULT_COLOR.to_owned());
    }
    if sizes.is_empty() {
        sizes.push(DEFAULT_SIZE.to_owned());
    }

    let mut print_locations: Vec<PrintLocation> = Vec::new();
    for v in &variants {
        if let Some(loc) = v.print_location
            && !print_locations.contains(&loc)
        {
            print_locations.push(loc);
        }
    }
    print_locations.sort_by_key(|loc| loc.sort_rank());

    let base_price = variants
        .iter()
        .filter_map(|v| v.price)
        .filter(|p| *p > Decimal::ZERO)
        .min()
        .unwrap_or(Decimal::ZERO);

    let variation_total: i64 = variants
        .iter()
        .filter_map(|v| v.quantity_available)
        .map(|q| q.max(0))
        .sum();
    let any_variation_tracked = variants.iter().any(|v| v.quantity_available.is_some());
    let item_inventory = item.inventory.as_ref().and_then(coerce_quantity);
    // Positive variation counts win; a zero total (including all-zero
    // variations) falls back to the item-level number when one exists.
    let (aggregate_inventory, inventory_tracked) = if variation_total > 0 {
        (variation_total, true)
    } else if let Some(count) = item_inventory {
        (count.max(0), true)
    } else {
        (0, any_variation_tracked)
    };

    Some(Product {
        id,
        name,
        description: item.description.unwrap_or_default(),
        kind: item
            .kind
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| "T-Shirts".to_owned()),
        audience: item.audience.unwrap_or_default(),
        subcategory: item.subcategory.filter(|s| !s.trim().is_empty()),
        image: item.image.filter(|u| !u.trim().is_empty()),
        base_price,
        colors,
        sizes,
        print_locations,
        variants,
        aggregate_inventory,
        inventory_tracked,
        flags: normalize_flags(item.flags),
    })
}

fn normalize_variation(raw: RawVariation) -> Variant {
    let print_location = raw
        .print_location
        .as_deref()
        .and_then(PrintLocation::parse)
        .or_else(|| raw.name.as_deref().and_then(PrintLocation::infer_from_name));
    let quantity_available = extract_quantity(&raw);
    Variant {
        color: raw.color.unwrap_or_default(),
        size: raw.size.unwrap_or_default(),
        print_location,
        price: raw.price.as_ref().and_then(coerce_price),
        quantity_available,
        external_variant_id: raw.id.map(VariantId::from),
        sku: raw.sku.filter(|s| !s.trim().is_empty()),
    }
}

/// Searches the variation's undeclared fields for a stock count.
fn extract_quantity(raw: &RawVariation) -> Option<i64> {
    QUANTITY_FIELDS
        .iter()
        .find_map(|field| raw.extra.get(*field).and_then(coerce_quantity))
}

fn coerce_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Prices arrive as JSON numbers or decimal strings. Anything else is
/// treated as unpriced.
fn coerce_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn normalize_flags(flags: Option<RawFlags>) -> ProductFlags {
    let Some(raw) = flags else {
        return ProductFlags::default();
    };
    let ribbon_type = match raw.ribbon_type.as_deref().map(str::trim) {
        Some(t) if t.eq_ignore_ascii_case("new") => RibbonType::New,
        Some(t) if t.eq_ignore_ascii_case("featured") => RibbonType::Featured,
        Some(t) if t.eq_ignore_ascii_case("custom") => RibbonType::Custom,
        _ => RibbonType::None,
    };
    ProductFlags {
        is_new: raw.is_new,
        is_featured: raw.is_featured,
        pin_to_top: raw.pin_to_top,
        hide_online: raw.hide_online,
        hide_kiosk: raw.hide_kiosk,
        ribbon_type,
        ribbon_custom_text: raw.ribbon_custom_text.unwrap_or_default(),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|existing| existing == v) {
            out.push(v.to_owned());
        }
    }
    out
}

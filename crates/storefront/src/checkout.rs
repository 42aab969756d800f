//! Checkout submission and stock-conflict reconciliation.
//!
//! One attempt per call: validate, submit, and either hand back a redirect
//! URL or repair the cart from the server's conflict report. The shopper
//! reviews the repaired cart and tries again; there are no automatic
//! retries.

use thiserror::Error;
use tracing::{info, instrument, warn};

use sugarplum_core::to_cents;

use crate::backend::types::{
    CheckoutLineItem, CheckoutRequest, CustomerInfo, StockConflictEntry,
};
use crate::backend::{BackendClient, BackendError, CheckoutApiResponse};
use crate::cart::totals::shipping_for;
use crate::cart::{CartLine, CartStore};
use crate::config::ShopSettings;
use crate::state::CatalogState;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Please enter your {0}.")]
    MissingField(&'static str),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// How one conflicting line was repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    Removed,
    ReducedTo(i64),
}

/// One repaired line, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRepair {
    pub name: String,
    pub color: String,
    pub size: String,
    pub repair: Repair,
}

/// Outcome of a repaired conflict: what changed, plus a ready-made message.
#[derive(Debug, Clone)]
pub struct ConflictSummary {
    pub repairs: Vec<LineRepair>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Send the shopper here to pay. The cart is intentionally left intact
    /// until payment actually completes.
    Redirect(String),
    /// Stock moved; the cart has been repaired and persisted. Show the
    /// message and let the shopper re-submit.
    StockConflict(ConflictSummary),
}

/// Runs one checkout attempt against the backend.
///
/// On a stock conflict the cart is repaired from the server's report, the
/// catalog cache is invalidated and a reload is attempted; a failed reload
/// is logged but does not mask the conflict outcome.
#[instrument(skip_all, fields(lines = cart.lines().len()))]
pub async fn submit(
    client: &BackendClient,
    cart: &mut CartStore,
    catalog: &mut CatalogState,
    customer: &CustomerInfo,
    settings: &ShopSettings,
) -> Result<CheckoutOutcome, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if customer.name.trim().is_empty() {
        return Err(CheckoutError::MissingField("name"));
    }
    if customer.email.trim().is_empty() {
        return Err(CheckoutError::MissingField("email"));
    }

    let request = build_request(cart.lines(), customer, settings);
    match client.submit_checkout(&request).await? {
        CheckoutApiResponse::Redirect(url) => {
            info!("checkout accepted");
            Ok(CheckoutOutcome::Redirect(url))
        }
        CheckoutApiResponse::OutOfStock(conflicts) => {
            let summary = repair_cart(cart, &conflicts);
            client.invalidate_cache();
            match client.fetch_catalog().await {
                Ok(products) => {
                    let ticket = catalog.begin_load();
                    catalog.apply_load(ticket, products);
                }
                Err(e) => warn!(error = %e, "catalog refresh after conflict failed"),
            }
            Ok(CheckoutOutcome::StockConflict(summary))
        }
    }
}

fn build_request(
    lines: &[CartLine],
    customer: &CustomerInfo,
    settings: &ShopSettings,
) -> CheckoutRequest {
    let subtotal = lines.iter().map(CartLine::line_total).sum();
    let shipping = shipping_for(subtotal, settings);
    CheckoutRequest {
        cart: lines
            .iter()
            .map(|line| CheckoutLineItem {
                id: line.product_id.as_str().to_owned(),
                name: line.product_name.clone(),
                kind: line.kind.clone(),
                color: line.color.clone(),
                size: line.size.clone(),
                print_side: line.print_location.map(|p| p.label().to_owned()),
                sku: line.sku.clone(),
                price: to_cents(line.unit_price),
                quantity: line.quantity,
                square_variation_id: line
                    .external_variant_id
                    .as_ref()
                    .map(|id| id.as_str().to_owned()),
                catalog_object_id: Some(line.product_id.as_str().to_owned()),
            })
            .collect(),
        customer: customer.clone(),
        shipping_total_cents: to_cents(shipping),
    }
}

/// Applies the server's availability to matching cart lines and persists
/// the result.
fn repair_cart(cart: &mut CartStore, conflicts: &[StockConflictEntry]) -> ConflictSummary {
    let mut repairs = Vec::new();
    for conflict in conflicts {
        // Walk back to front so removals don't shift pending indexes.
        for index in (0..cart.lines().len()).rev() {
            let Some(line) = cart.lines().get(index) else {
                continue;
            };
            if !conflict_matches(conflict, line) {
                continue;
            }
            let (name, color, size) =
                (line.product_name.clone(), line.color.clone(), line.size.clone());
            let held = line.quantity;
            if conflict.available_qty <= 0 {
                cart.apply_server_quantity(index, 0);
                repairs.push(LineRepair {
                    name,
                    color,
                    size,
                    repair: Repair::Removed,
                });
            } else if conflict.available_qty < held {
                cart.apply_server_quantity(index, conflict.available_qty);
                repairs.push(LineRepair {
                    name,
                    color,
                    size,
                    repair: Repair::ReducedTo(conflict.available_qty),
                });
            }
        }
    }
    cart.persist();

    let details: Vec<String> = repairs
        .iter()
        .map(|r| match &r.repair {
            Repair::Removed => format!("{} ({} / {}) removed", r.name, r.color, r.size),
            Repair::ReducedTo(n) => {
                format!("{} ({} / {}) reduced to {n}", r.name, r.color, r.size)
            }
        })
        .collect();
    let message = if details.is_empty() {
        "Some items are no longer available. Please review your cart and try again.".to_owned()
    } else {
        format!(
            "Some items are no longer available: {}. Your cart has been updated - please review and try again.",
            details.join("; ")
        )
    };
    ConflictSummary { repairs, message }
}

/// A conflict matches a line by product id when the server sent one,
/// otherwise by product name; color and size narrow the match when present.
fn conflict_matches(conflict: &StockConflictEntry, line: &CartLine) -> bool {
    let id_match = match &conflict.product_id {
        Some(id) => line.product_id.as_str() == id,
        None => line.product_name.eq_ignore_ascii_case(conflict.name.trim()),
    };
    if !id_match {
        return false;
    }
    if let Some(color) = conflict.color.as_deref()
        && !color.trim().is_empty()
        && !line.color.eq_ignore_ascii_case(color.trim())
    {
        return false;
    }
    if let Some(size) = conflict.size.as_deref()
        && !size.trim().is_empty()
        && !line.size.eq_ignore_ascii_case(size.trim())
    {
        return false;
    }
    true
}

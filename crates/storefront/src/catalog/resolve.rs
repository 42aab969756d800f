//! Maps a shopper's (color, size, print location) selection onto a concrete
//! variant, and answers "how many can they buy".

use rust_decimal::Decimal;

use crate::catalog::types::{PrintLocation, Product, Variant};

/// Purchase cap when no quantity signal exists anywhere for a selection.
/// Large enough to never clamp a real order, small enough to add safely.
pub const STOCK_UNKNOWN_CAP: i64 = 1_000_000;

/// Blank-safe comparison: missing values are treated as the literal empty
/// string, so two blanks match and a blank never matches a real value.
fn eq_ci(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Resolves a selection to a variant.
///
/// Passes, in order:
/// 1. when a print location was selected, exact match on color, size and
///    print location;
/// 2. color+size match ignoring print location, preferring a front-printed
///    variant when several remain. Front is the most common default SKU
///    across multi-print products, so it wins ambiguous selections.
///
/// `None` when no variant matches the color and size at all.
pub fn resolve<'a>(
    product: &'a Product,
    color: &str,
    size: &str,
    print_location: Option<PrintLocation>,
) -> Option<&'a Variant> {
    if print_location.is_some() {
        let exact = product.variants.iter().find(|v| {
            eq_ci(&v.color, color) && eq_ci(&v.size, size) && v.print_location == print_location
        });
        if exact.is_some() {
            return exact;
        }
    }

    let mut candidates = product
        .variants
        .iter()
        .filter(|v| eq_ci(&v.color, color) && eq_ci(&v.size, size));
    let first = candidates.next()?;
    if first.print_location == Some(PrintLocation::Front) {
        return Some(first);
    }
    Some(
        candidates
            .find(|v| v.print_location == Some(PrintLocation::Front))
            .unwrap_or(first),
    )
}

/// Unit price for a selection: the resolved variant's price when it has a
/// non-negative one (an explicit zero is honored), otherwise the product
/// base price.
pub fn price_for(
    product: &Product,
    color: &str,
    size: &str,
    print_location: Option<PrintLocation>,
) -> Decimal {
    resolve(product, color, size, print_location)
        .and_then(|v| v.price)
        .filter(|p| *p >= Decimal::ZERO)
        .unwrap_or(product.base_price)
}

/// Maximum purchasable quantity for a selection.
///
/// The resolved variant's own count wins when positive. Failing that, a
/// positive product aggregate applies. With no signal at all the cap is
/// [`STOCK_UNKNOWN_CAP`]: an untracked catalog must not block sales.
pub fn max_available(
    product: &Product,
    color: &str,
    size: &str,
    print_location: Option<PrintLocation>,
) -> i64 {
    if let Some(qty) = resolve(product, color, size, print_location)
        .and_then(|v| v.quantity_available)
        .filter(|q| *q > 0)
    {
        return qty;
    }
    if product.inventory_tracked && product.aggregate_inventory > 0 {
        return product.aggregate_inventory;
    }
    if product.inventory_tracked {
        // Confirmed zero everywhere.
        return 0;
    }
    STOCK_UNKNOWN_CAP
}

//! Order math: shipping, convenience fee, regional tax and the grand total.

use rust_decimal::Decimal;
use sugarplum_core::round_display;

use crate::cart::CartLine;
use crate::config::ShopSettings;

/// Computed order totals, in dollars. Fee and tax are rounded to cents
/// individually before summing, so the grand total always equals the sum of
/// the displayed components.
#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals {
    pub item_count: i64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub convenience_fee: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl CartTotals {
    /// `region` is the shopper's shipping region; tax applies only when it
    /// matches the configured taxable region, case-insensitively.
    pub fn compute(lines: &[CartLine], settings: &ShopSettings, region: Option<&str>) -> Self {
        let item_count = lines.iter().map(|l| l.quantity).sum();
        let subtotal = round_display(lines.iter().map(CartLine::line_total).sum());
        let shipping = shipping_for(subtotal, settings);
        let convenience_fee =
            round_display((subtotal + shipping) * settings.convenience_fee_rate);
        let taxable = match (&settings.taxable_region, region) {
            (Some(configured), Some(actual)) => configured.eq_ignore_ascii_case(actual.trim()),
            _ => false,
        };
        let tax = if taxable {
            round_display((subtotal + shipping) * settings.tax_rate)
        } else {
            Decimal::ZERO
        };
        Self {
            item_count,
            subtotal,
            shipping,
            convenience_fee,
            tax,
            grand_total: subtotal + shipping + convenience_fee + tax,
        }
    }
}

/// Flat-rate shipping. Free for an empty cart, and for subtotals at or
/// above the threshold when a positive threshold is configured.
pub fn shipping_for(subtotal: Decimal, settings: &ShopSettings) -> Decimal {
    if subtotal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if settings.free_shipping_threshold > Decimal::ZERO
        && subtotal >= settings.free_shipping_threshold
    {
        return Decimal::ZERO;
    }
    settings.shipping_flat_rate
}

/// Banner text nudging the shopper toward free shipping. `None` when free
/// shipping is disabled or the cart is empty.
pub fn free_shipping_message(subtotal: Decimal, settings: &ShopSettings) -> Option<String> {
    if settings.free_shipping_threshold <= Decimal::ZERO || subtotal <= Decimal::ZERO {
        return None;
    }
    if subtotal >= settings.free_shipping_threshold {
        Some("You're getting FREE shipping!".to_owned())
    } else {
        let remaining = round_display(settings.free_shipping_threshold - subtotal);
        Some(format!("Add ${remaining:.2} more for FREE shipping."))
    }
}

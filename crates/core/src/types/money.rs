//! Money arithmetic helpers.
//!
//! All monetary amounts in the engine are `rust_decimal::Decimal` dollar
//! values. The checkout wire format uses integer minor units (cents), and
//! anything user-facing is rounded to two decimal places at the point of
//! display - intermediate arithmetic stays unrounded.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Convert a dollar amount to integer cents, rounding halves away from zero.
///
/// Out-of-range amounts (beyond what fits in `i64` cents) saturate rather
/// than wrap; catalog prices never get anywhere near that boundary.
#[must_use]
pub fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Convert integer cents back to a dollar amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Round a dollar amount to two decimal places for display.
#[must_use]
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Format a dollar amount as a display string, e.g. `$19.99`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", round_display(amount))
}

//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Conversion itself never rounds; sums stay exact
//! - Round once, at emission, to the currency's decimal places
//! - Midpoints round away from zero (`-35.005` -> `-35.01`)

use bigdecimal::BigDecimal;
use rust_decimal::Decimal;
use tally_shared::types::{exact, round_half_away};

use super::directory::CurrencyInfo;

/// Converts an amount using the given exchange rate, without rounding.
///
/// The product is arbitrary precision, so it neither truncates nor overflows.
#[must_use]
pub fn convert_amount(amount: &BigDecimal, rate: Decimal) -> BigDecimal {
    amount * exact(rate)
}

/// Rounds a final value to the currency's decimal places.
#[must_use]
pub fn round_for_currency(value: &BigDecimal, currency: &CurrencyInfo) -> BigDecimal {
    round_half_away(value, currency.decimal_places)
}

//! Decimal amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Ledger amounts and running sums are `BigDecimal`: addition and
//! multiplication never round and never overflow. Fixed-size
//! `rust_decimal::Decimal` is used for rates and presentation values. The
//! only float ever produced is a display value derived once from a final
//! decimal.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};
use rust_decimal::Decimal;
use serde::Serializer;
use thiserror::Error;

/// Error returned when a decimal string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid amount: {0:?}")]
pub struct AmountError(pub String);

/// Parses a ledger amount such as `"20.005"` or `"-3"`, at any precision.
///
/// # Errors
///
/// Returns `AmountError` if the string is not a plain decimal number.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, AmountError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| AmountError(raw.to_string()))
}

/// Widens a fixed-size decimal without changing its value or scale.
#[must_use]
pub fn exact(amount: Decimal) -> BigDecimal {
    BigDecimal::new(BigInt::from(amount.mantissa()), i64::from(amount.scale()))
}

/// Narrows to a fixed-size decimal; `None` if any digit would be lost.
#[must_use]
pub fn narrow(value: &BigDecimal) -> Option<Decimal> {
    Decimal::from_str_exact(&value.to_plain_string()).ok()
}

/// Returns `|amount|`.
#[must_use]
pub fn positive(amount: &BigDecimal) -> BigDecimal {
    amount.abs()
}

/// Returns `-|amount|`.
#[must_use]
pub fn negative(amount: &BigDecimal) -> BigDecimal {
    -amount.abs()
}

/// Rounds half away from zero and pads to exactly `decimal_places`.
///
/// `-35.005` at 2 places becomes `-35.01`; `100` at 2 places becomes
/// `100.00`.
#[must_use]
pub fn round_half_away(value: &BigDecimal, decimal_places: u32) -> BigDecimal {
    value.with_scale_round(i64::from(decimal_places), RoundingMode::HalfUp)
}

/// Plain decimal string, never in exponent notation.
#[must_use]
pub fn plain(value: &BigDecimal) -> String {
    value.to_plain_string()
}

/// Lossy float for sorting and display only.
#[must_use]
pub fn display_float(value: &BigDecimal) -> f64 {
    value.to_plain_string().parse().unwrap_or_default()
}

/// Serializes a `BigDecimal` as a plain decimal string.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn serialize_plain<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_plain_string())
}

/// Serializes an optional `BigDecimal` as a plain decimal string or null.
///
/// # Errors
///
/// Returns the serializer's error.
#[allow(clippy::ref_option)]
pub fn serialize_plain_option<S: Serializer>(
    value: &Option<BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_str(&value.to_plain_string()),
        None => serializer.serialize_none(),
    }
}

//! Property-based tests for aggregation.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::exact;

use super::aggregator::TransactionSummarizer;
use crate::currency::{CurrencyInfo, ExchangeRateConverter, InMemoryRateProvider};
use crate::policy::{ConversionPolicy, SignMode};
use crate::transaction::{TransactionRecord, TransactionType};

/// Smallest unit the ledger stores: amounts are `decimal(32, 12)`.
const PICO: i128 = 1_000_000_000_000;

fn eur() -> CurrencyInfo {
    CurrencyInfo::new(1, "EUR", "Euro", "€", 2)
}

/// Strategy to generate amounts with up to 4 decimals (0.0000 to 100,000.0000).
fn amount() -> impl Strategy<Value = BigDecimal> {
    (0i64..1_000_000_000i64, 0u32..=4).prop_map(|(raw, scale)| exact(Decimal::new(raw, scale)))
}

/// Ledger-width amounts in picos: integer part up to 10^20, 12 fraction digits.
fn ledger_picos() -> impl Strategy<Value = i128> {
    (0i128..=100_000_000_000_000_000_000i128, 0i128..PICO).prop_map(|(int, frac)| int * PICO + frac)
}

/// Amounts in picos whose written scale varies from 0 to 12 digits.
fn mixed_scale_picos() -> impl Strategy<Value = (i128, u32)> {
    (0i128..=100_000_000_000_000_000_000i128, 0u32..=12)
        .prop_map(|(mantissa, scale)| (mantissa * 10i128.pow(12 - scale), scale))
}

/// Integers close to `Decimal::MAX`; two of them no longer fit 96 bits.
fn near_decimal_max() -> impl Strategy<Value = i128> {
    40_000_000_000_000_000_000_000_000_000i128..=79_228_162_514_264_337_593_543_950_335i128
}

fn picos(units: i128) -> BigDecimal {
    BigDecimal::new(BigInt::from(units), 12)
}

/// Formats picos with exactly 12 fraction digits.
fn fixed12(units: i128) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let abs = units.unsigned_abs();
    let pico = PICO.unsigned_abs();
    format!("{sign}{}.{:012}", abs / pico, abs % pico)
}

fn sign_picos(sign: SignMode, units: i128) -> i128 {
    match sign {
        SignMode::Positive => units,
        SignMode::Negative => -units,
    }
}

fn sign_mode() -> impl Strategy<Value = SignMode> {
    prop_oneof![Just(SignMode::Positive), Just(SignMode::Negative)]
}

fn records(amounts: &[BigDecimal]) -> Vec<TransactionRecord> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let mut record = TransactionRecord::new(
                i as u64 + 1,
                Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                Decimal::ZERO,
                &eur(),
                TransactionType::Withdrawal,
            );
            record.amount = amount.clone();
            record
        })
        .collect()
}

fn summarize(amounts: &[BigDecimal], sign: SignMode) -> super::BucketMap {
    let provider = InMemoryRateProvider::default();
    let converter = ExchangeRateConverter::new(&provider);
    let policy = ConversionPolicy::new(eur(), false);
    TransactionSummarizer::new(&policy, &converter)
        .group_by_currency_id(&records(amounts), sign, true)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A single-currency sum equals the exact decimal sum of its inputs.
    #[test]
    fn prop_sum_is_exact(units in prop::collection::vec(ledger_picos(), 0..50), sign in sign_mode()) {
        let amounts: Vec<BigDecimal> = units.iter().copied().map(picos).collect();
        let buckets = summarize(&amounts, sign);

        let expected: i128 = units.iter().map(|u| sign_picos(sign, *u)).sum();
        match buckets.get_currency(eur().id) {
            Some(bucket) => {
                prop_assert_eq!(bucket.to_entry().sum, fixed12(expected));
                prop_assert_eq!(bucket.count, units.len());
            }
            None => prop_assert!(units.is_empty()),
        }
    }

    /// Inputs written at different scales still sum to the exact value.
    #[test]
    fn prop_mixed_scales_sum_exactly(values in prop::collection::vec(mixed_scale_picos(), 1..50), sign in sign_mode()) {
        let amounts: Vec<BigDecimal> = values
            .iter()
            .map(|(units, scale)| picos(*units).with_scale(i64::from(*scale)))
            .collect();
        let buckets = summarize(&amounts, sign);

        let expected: i128 = values.iter().map(|(u, _)| sign_picos(sign, *u)).sum();
        let bucket = buckets.get_currency(eur().id).unwrap();
        prop_assert_eq!(&bucket.sum, &picos(expected));
    }

    /// Sums past the range of a 96-bit decimal neither panic nor wrap.
    #[test]
    fn prop_sum_past_decimal_max(values in prop::collection::vec(near_decimal_max(), 2..10), sign in sign_mode()) {
        let amounts: Vec<BigDecimal> = values.iter().map(|v| BigDecimal::from(BigInt::from(*v))).collect();
        let buckets = summarize(&amounts, sign);

        let expected: i128 = values.iter().map(|v| sign_picos(sign, *v)).sum();
        prop_assert_eq!(buckets.entries()[0].sum.clone(), expected.to_string());
    }

    /// Aggregating twice yields identical decimal strings.
    #[test]
    fn prop_aggregate_is_idempotent(amounts in prop::collection::vec(amount(), 1..50)) {
        let provider = InMemoryRateProvider::default();
        let converter = ExchangeRateConverter::new(&provider);
        let policy = ConversionPolicy::new(eur(), true);
        let summarizer = TransactionSummarizer::new(&policy, &converter);
        let input = records(&amounts);

        let first = summarizer.group_by_currency_id(&input, SignMode::Negative, true).unwrap();
        let second = summarizer.group_by_currency_id(&input, SignMode::Negative, true).unwrap();

        let first: Vec<String> = first.entries().into_iter().map(|e| e.sum).collect();
        let second: Vec<String> = second.entries().into_iter().map(|e| e.sum).collect();
        prop_assert_eq!(first, second);
    }

    /// Negative mode never produces a positive bucket, positive never a negative one.
    #[test]
    fn prop_sign_mode_fixes_sign(amounts in prop::collection::vec(amount(), 1..20), sign in sign_mode()) {
        let buckets = summarize(&amounts, sign);
        let sum = &buckets.get_currency(eur().id).unwrap().sum;
        match sign {
            SignMode::Negative => prop_assert!(*sum <= BigDecimal::zero()),
            SignMode::Positive => prop_assert!(*sum >= BigDecimal::zero()),
        }
    }
}

#[test]
fn test_fixed12() {
    assert_eq!(fixed12(0), "0.000000000000");
    assert_eq!(fixed12(-1), "-0.000000000001");
    assert_eq!(fixed12(100_000_000_000_000_000_000 * PICO + 1), "100000000000000000000.000000000001");
}

//! Property-based tests for currency attribution.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::exact;

use super::conversion::{AmountSource, ConversionPolicy};
use crate::currency::{CurrencyError, CurrencyInfo, ExchangeRateConverter, RateProvider};
use crate::transaction::{TransactionRecord, TransactionType};

struct FailingProvider;

impl RateProvider for FailingProvider {
    fn find_rate(
        &self,
        from: &CurrencyInfo,
        to: &CurrencyInfo,
        date: NaiveDate,
    ) -> Result<Decimal, CurrencyError> {
        Err(CurrencyError::RateNotFound {
            from: from.code.clone(),
            to: to.code.clone(),
            date,
        })
    }
}

fn eur() -> CurrencyInfo {
    CurrencyInfo::new(1, "EUR", "Euro", "€", 2)
}

fn usd() -> CurrencyInfo {
    CurrencyInfo::new(2, "USD", "US Dollar", "$", 2)
}

/// Strategy to generate amounts from 0.000 to 1,000,000.000.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|milli| Decimal::new(milli, 3))
}

fn record(amount: Decimal, currency: &CurrencyInfo, day: u32) -> TransactionRecord {
    TransactionRecord::new(
        u64::from(day),
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        amount,
        currency,
        TransactionType::Withdrawal,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Without conversion the main leg is always the native amount.
    #[test]
    fn prop_unconverted_reads_native_amount(value in amount(), foreign in amount(), day in 1u32..28) {
        let converter = ExchangeRateConverter::new(&FailingProvider);
        let policy = ConversionPolicy::new(eur(), false);
        let rec = record(value, &usd(), day).with_foreign(foreign, &eur());

        let resolved = policy.resolve(&rec, &converter).unwrap();
        prop_assert_eq!(resolved.main.amount, exact(value));
        prop_assert_eq!(resolved.main.currency.id, usd().id);
        prop_assert_eq!(resolved.foreign.map(|leg| leg.amount), Some(exact(foreign)));
    }

    /// Records already in the primary currency never reach the converter.
    #[test]
    fn prop_primary_records_skip_converter(value in amount(), day in 1u32..28) {
        let converter = ExchangeRateConverter::new(&FailingProvider);
        let policy = ConversionPolicy::new(eur(), true);

        let resolved = policy.resolve(&record(value, &eur(), day), &converter).unwrap();
        prop_assert_eq!(resolved.main.amount, exact(value));
        prop_assert_eq!(converter.summarize().lookups, 0);
    }

    /// A foreign leg in the primary currency is taken verbatim.
    #[test]
    fn prop_primary_foreign_leg_is_exact(value in amount(), foreign in amount()) {
        let converter = ExchangeRateConverter::new(&FailingProvider);
        let policy = ConversionPolicy::new(eur(), true);
        let rec = record(value, &usd(), 3).with_foreign(foreign, &eur());

        let resolved = policy.resolve(&rec, &converter).unwrap();
        prop_assert_eq!(resolved.main.amount, exact(foreign));
        prop_assert_eq!(resolved.main.source, AmountSource::Foreign);
    }

    /// A failing provider degrades to face value.
    #[test]
    fn prop_failed_rate_keeps_face_value(value in amount(), day in 1u32..28) {
        let converter = ExchangeRateConverter::new(&FailingProvider);
        let policy = ConversionPolicy::new(eur(), true);

        let resolved = policy.resolve(&record(value, &usd(), day), &converter).unwrap();
        prop_assert_eq!(resolved.main.amount, exact(value));
        prop_assert_eq!(resolved.main.currency.id, eur().id);
        prop_assert_eq!(converter.summarize().fallbacks, 1);
    }
}

//! Integration tests for the reporting pipeline.
//!
//! Feeds a ledger export through the public API the way the report binary
//! does: deserialize, build a context, run façades, serialize.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tally_core::currency::{CurrencyInfo, ExchangeRate, InMemoryCurrencyDirectory, InMemoryRateProvider};
use tally_core::policy::{ConversionPolicy, SignMode};
use tally_core::reports::{
    AccountReports, ChartReports, InMemoryLedger, InsightReports, JournalFilter, ReportContext,
    TransactionQuery,
};
use tally_core::summary::{SortOrder, TransactionSummarizer, by_period};
use tally_core::series::Period;
use tally_core::transaction::TransactionRecord;
use tally_shared::AppError;
use tally_shared::types::{AccountId, CurrencyId, exact};

const EXPORT: &str = r#"[
    {
        "transaction_journal_id": 1, "transaction_group_id": 1,
        "date": "2024-01-03T09:00:00Z", "amount": "20.005",
        "currency_id": 1, "currency_code": "EUR", "currency_name": "Euro",
        "currency_symbol": "€", "currency_decimal_places": 2,
        "foreign_currency_id": 0,
        "transaction_type_type": "Withdrawal",
        "source_account_id": 1, "source_account_name": "Checking",
        "destination_account_id": 10, "destination_account_name": "Grocer",
        "category_id": 5, "category_name": "Food"
    },
    {
        "transaction_journal_id": 2, "transaction_group_id": 2,
        "date": "2024-01-10T09:00:00Z", "amount": "15.005",
        "currency_id": 1, "currency_code": "EUR", "currency_name": "Euro",
        "currency_symbol": "€", "currency_decimal_places": 2,
        "transaction_type_type": "withdrawal",
        "source_account_id": 1, "source_account_name": "Checking",
        "destination_account_id": 10, "destination_account_name": "Grocer",
        "category_id": 0
    },
    {
        "transaction_journal_id": 3, "transaction_group_id": 3,
        "date": "2024-02-01T09:00:00Z", "amount": "50",
        "currency_id": 2, "currency_code": "USD", "currency_name": "US Dollar",
        "currency_symbol": "$", "currency_decimal_places": 2,
        "transaction_type_type": "Withdrawal",
        "source_account_id": 3, "source_account_name": "Dollar card",
        "destination_account_id": 11, "destination_account_name": "Web shop"
    }
]"#;

fn eur() -> CurrencyInfo {
    CurrencyInfo::new(1, "EUR", "Euro", "€", 2)
}

fn usd() -> CurrencyInfo {
    CurrencyInfo::new(2, "USD", "US Dollar", "$", 2)
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn ledger() -> InMemoryLedger {
    let records: Vec<TransactionRecord> = serde_json::from_str(EXPORT).unwrap();
    InMemoryLedger::new(records)
}

fn accounts() -> Vec<AccountId> {
    vec![AccountId::new(1), AccountId::new(3)]
}

// ============================================================================
// End-to-end: EUR expenses summed exactly, rounded once
// ============================================================================
#[test]
fn test_eur_expense_end_to_end() {
    let ledger = ledger();
    let directory = InMemoryCurrencyDirectory::new([eur(), usd()]);
    let provider = InMemoryRateProvider::default();
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let totals = InsightReports::new(&context)
        .expense_total(&accounts(), date(1, 1), date(1, 31))
        .unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].difference, "-35.010");
    assert_eq!(totals[0].difference_float.to_string(), "-35.01");

    let json = serde_json::to_value(&totals).unwrap();
    assert_eq!(json[0]["currency_code"], "EUR");
    assert_eq!(json[0]["currency_decimal_places"], 2);
}

// ============================================================================
// Converting: one provider call per (currency, date), cached afterwards
// ============================================================================
#[test]
fn test_converting_uses_rates_once() {
    let ledger = ledger();
    let directory = InMemoryCurrencyDirectory::new([eur(), usd()]);
    let provider = InMemoryRateProvider::new(vec![ExchangeRate::new(
        usd().id,
        eur().id,
        dec!(0.92),
        date(1, 1),
    )]);
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));
    let insight = InsightReports::new(&context);

    let first = insight.expense_total(&accounts(), date(1, 1), date(2, 29)).unwrap();
    let second = insight.expense_total(&accounts(), date(1, 1), date(2, 29)).unwrap();

    assert_eq!(first.len(), 1);
    // -35.010 - 46.00
    assert_eq!(first[0].difference, "-81.010");
    assert_eq!(first[0].difference, second[0].difference);

    let stats = context.finish();
    assert_eq!(stats.provider_calls, 1);
}

// ============================================================================
// Missing rates degrade to 1 instead of failing
// ============================================================================
#[test]
fn test_missing_rate_falls_back() {
    let ledger = ledger();
    let directory = InMemoryCurrencyDirectory::new([eur(), usd()]);
    let provider = InMemoryRateProvider::default();
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));

    let totals = InsightReports::new(&context)
        .expense_total(&[AccountId::new(3)], date(2, 1), date(2, 29))
        .unwrap();

    assert_eq!(totals[0].currency.currency_id, CurrencyId::new(1));
    assert_eq!(totals[0].difference, "-50");
    assert_eq!(context.finish().fallbacks, 1);
}

// ============================================================================
// Period grouping through the summarizer
// ============================================================================
#[test]
fn test_monthly_grouping_sorted() {
    let ledger = ledger();
    let provider = InMemoryRateProvider::default();
    let converter = tally_core::currency::ExchangeRateConverter::new(&provider);
    let policy = ConversionPolicy::new(eur(), false);
    let records = ledger.journals(&JournalFilter::new(date(1, 1), date(12, 31))).unwrap();

    let buckets = TransactionSummarizer::new(&policy, &converter)
        .aggregate(&records, by_period(Period::Month), SignMode::Negative)
        .unwrap();
    let sorted: Vec<String> = buckets
        .sorted_by_float(SortOrder::Ascending)
        .into_iter()
        .map(|bucket| bucket.key.to_string())
        .collect();

    assert_eq!(sorted, ["2-2024-02", "1-2024-01"]);
}

// ============================================================================
// Reports serialize to the documented shapes
// ============================================================================
#[test]
fn test_report_shapes() {
    let ledger = ledger();
    let directory = InMemoryCurrencyDirectory::new([eur(), usd()]);
    let provider = InMemoryRateProvider::default();
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let report = AccountReports::new(&context)
        .expense_report(&accounts(), date(1, 1), date(2, 29))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["accounts"][0]["name"], "Web shop");
    assert_eq!(json["accounts"][1]["average"], "-17.51");
    assert!(json["accounts"][0].get("average").is_none());
    assert_eq!(json["sums"].as_array().unwrap().len(), 2);

    let chart = ChartReports::new(&context)
        .income_expense(&accounts(), date(1, 1), date(2, 29))
        .unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json[0]["label"], "earned");
    assert_eq!(json[0]["period"], "day");
    assert!(json[0].get("primary").is_none());
}

// ============================================================================
// Malformed records are fatal and map to a 500
// ============================================================================
#[test]
fn test_malformed_record_is_data_integrity_error() {
    let mut records: Vec<TransactionRecord> = serde_json::from_str(EXPORT).unwrap();
    records[0].foreign_amount = Some(exact(dec!(1)));
    let ledger = InMemoryLedger::new(records);
    let directory = InMemoryCurrencyDirectory::new([eur(), usd()]);
    let provider = InMemoryRateProvider::default();
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let err = InsightReports::new(&context)
        .expense_total(&accounts(), date(1, 1), date(1, 31))
        .unwrap_err();
    let app: AppError = err.into();

    assert_eq!(app.status_code(), 500);
    assert_eq!(app.error_code(), "DATA_INTEGRITY_ERROR");
}

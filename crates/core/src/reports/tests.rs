//! Scenario tests for the reporting façades.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, BudgetId, CategoryId, CurrencyId, TagId, exact};

use super::*;
use crate::currency::{CurrencyInfo, ExchangeRate, InMemoryCurrencyDirectory, InMemoryRateProvider};
use crate::policy::{ConversionPolicy, SignMode};
use crate::series::{BalanceSnapshot, FlowKind};
use crate::transaction::{TransactionRecord, TransactionType};

const CHECKING: u64 = 1;
const SAVINGS: u64 = 2;
const GROCER: u64 = 10;
const LANDLORD: u64 = 11;
const EMPLOYER: u64 = 20;

fn eur() -> CurrencyInfo {
    CurrencyInfo::new(1, "EUR", "Euro", "€", 2)
}

fn usd() -> CurrencyInfo {
    CurrencyInfo::new(2, "USD", "US Dollar", "$", 2)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn record(
    journal: u64,
    d: u32,
    amount: Decimal,
    currency: &CurrencyInfo,
    kind: TransactionType,
    source: (u64, &str),
    destination: (u64, &str),
) -> TransactionRecord {
    TransactionRecord::new(
        journal,
        Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap(),
        amount,
        currency,
        kind,
    )
    .with_accounts(source, destination)
}

fn ledger() -> InMemoryLedger {
    let checking = (CHECKING, "Checking");
    let savings = (SAVINGS, "Savings");
    let grocer = (GROCER, "Grocer");
    let landlord = (LANDLORD, "Landlord");
    let employer = (EMPLOYER, "Employer");

    InMemoryLedger::new(vec![
        record(1, 3, dec!(20.005), &eur(), TransactionType::Withdrawal, checking, grocer)
            .with_category(5, "Food")
            .with_budget(7, "Living")
            .with_tag(1, "weekly"),
        record(2, 10, dec!(15.005), &eur(), TransactionType::Withdrawal, checking, grocer)
            .with_category(5, "Food")
            .with_budget(7, "Living"),
        record(3, 5, dec!(800), &eur(), TransactionType::Withdrawal, checking, landlord)
            .with_category(6, "Rent"),
        record(4, 1, dec!(2500), &eur(), TransactionType::Deposit, employer, checking)
            .with_category(8, "Salary")
            .with_tag(2, "salary"),
        record(5, 15, dec!(100), &usd(), TransactionType::Deposit, employer, checking)
            .with_foreign(dec!(90), &eur()),
        record(6, 20, dec!(300), &eur(), TransactionType::Transfer, checking, savings)
            .with_foreign(dec!(330), &usd())
            .with_category(9, "Saving"),
    ])
    .with_balances(
        AccountId::new(CHECKING),
        vec![
            BalanceSnapshot::new(day(1), eur().id, dec!(2500)),
            BalanceSnapshot::new(day(5), eur().id, dec!(1679.99)),
        ],
    )
}

fn directory() -> InMemoryCurrencyDirectory {
    InMemoryCurrencyDirectory::new([eur(), usd()])
}

fn rates() -> InMemoryRateProvider {
    InMemoryRateProvider::new(vec![ExchangeRate::new(usd().id, eur().id, dec!(0.9), day(1))])
}

fn own() -> Vec<AccountId> {
    vec![AccountId::new(CHECKING), AccountId::new(SAVINGS)]
}

#[test]
fn test_expense_report_per_destination() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let report = AccountReports::new(&context)
        .expense_report(&own(), day(1), day(31))
        .unwrap();

    // largest expense first
    let names: Vec<&str> = report.accounts.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["Landlord", "Grocer"]);

    let grocer = &report.accounts[1];
    assert_eq!(grocer.sum, "-35.010");
    assert_eq!(grocer.sum_float.to_string(), "-35.01");
    assert_eq!(grocer.count, 2);
    assert_eq!(grocer.average.as_deref(), Some("-17.51"));
    assert_eq!(report.accounts[0].average, None);

    assert_eq!(report.sums.len(), 1);
    assert_eq!(report.sums[0].sum, "-835.010");
    assert_eq!(report.sums[0].count, 3);
}

#[test]
fn test_income_report_per_source() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));

    let report = AccountReports::new(&context)
        .income_report(&own(), day(1), day(31))
        .unwrap();

    // native currencies, whatever the request policy says
    assert_eq!(report.accounts.len(), 2);
    assert_eq!(report.accounts[0].currency.currency_code, "EUR");
    assert_eq!(report.accounts[0].sum, "2500");
    assert_eq!(report.accounts[1].currency.currency_code, "USD");
    assert_eq!(report.accounts[1].sum, "100");
    assert_eq!(context.finish().provider_calls, 0);
}

#[test]
fn test_transfers_in_out_difference() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let rows = AccountReports::new(&context)
        .transfers(&own(), day(1), day(31))
        .unwrap();

    assert_eq!(rows.len(), 4);
    let checking_eur = &rows[0];
    assert_eq!(checking_eur.id, AccountId::new(CHECKING));
    assert_eq!(checking_eur.outflow, exact(dec!(-300)));
    assert_eq!(checking_eur.inflow, exact(Decimal::ZERO));
    assert_eq!(checking_eur.difference, exact(dec!(-300)));

    let savings_eur = &rows[1];
    assert_eq!(savings_eur.inflow, exact(dec!(300)));
    assert_eq!(savings_eur.difference_float.to_string(), "300");

    let savings_usd = &rows[3];
    assert_eq!(savings_usd.currency.currency_code, "USD");
    assert_eq!(savings_usd.inflow, exact(dec!(330)));
}

#[test]
fn test_transfers_past_decimal_range() {
    let checking = (CHECKING, "Checking");
    let savings = (SAVINGS, "Savings");
    let ledger = InMemoryLedger::new(vec![
        record(1, 2, dec!(50000000000000000000000000000), &eur(), TransactionType::Transfer, checking, savings),
        record(2, 3, dec!(50000000000000000000000000000), &eur(), TransactionType::Transfer, checking, savings),
        record(3, 4, dec!(0.000000000001), &eur(), TransactionType::Transfer, savings, checking),
    ]);
    let (directory, provider) = (directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let rows = AccountReports::new(&context)
        .transfers(&own(), day(1), day(31))
        .unwrap();
    let json = serde_json::to_value(&rows).unwrap();

    assert_eq!(json[0]["name"], "Checking");
    assert_eq!(json[0]["out"], "-100000000000000000000000000000");
    assert_eq!(json[0]["in"], "0.000000000001");
    assert_eq!(json[0]["difference"], "-99999999999999999999999999999.999999999999");
    assert_eq!(json[1]["in"], "100000000000000000000000000000");
}

#[test]
fn test_account_listings() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = AccountReports::new(&context);

    let expenses = reports.list_expenses(&own(), day(1), day(31)).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].transaction_journals.len(), 3);
    assert_eq!(expenses[0].transaction_journals[0].amount, exact(dec!(-20.005)));

    let income = reports.list_income(&own(), day(1), day(31)).unwrap();
    let codes: Vec<&str> = income.iter().map(|c| c.currency.currency_code.as_str()).collect();
    assert_eq!(codes, ["EUR", "USD"]);
    assert_eq!(income[1].transaction_journals[0].amount, exact(dec!(100)));
}

#[test]
fn test_sum_income_prefers_foreign_primary_leg() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));

    let sums = AccountReports::new(&context)
        .sum_income(&own(), day(1), day(31))
        .unwrap();

    assert_eq!(sums.len(), 1);
    // 2500 + 90 (foreign leg already in EUR)
    assert_eq!(sums[0].sum, "2590");
    assert_eq!(context.finish().provider_calls, 0);
}

#[test]
fn test_sum_expenses_by_destination() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));

    let sums = AccountReports::new(&context)
        .sum_expenses_by_destination(&own(), day(1), day(31))
        .unwrap();

    assert_eq!(sums.len(), 2);
    assert_eq!(sums[0].name.as_deref(), Some("Grocer"));
    assert_eq!(sums[0].sum, "-35.010");
}

#[test]
fn test_category_listings() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = CategoryReports::new(&context);

    let expenses = reports.list_expenses(&own(), &[], day(1), day(31)).unwrap();
    let names: Vec<&str> = expenses[0].categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Food", "Rent"]);
    assert_eq!(expenses[0].categories[0].transaction_journals.len(), 2);

    let income = reports.list_income(&own(), &[], day(1), day(31)).unwrap();
    assert_eq!(income.len(), 2);
    assert_eq!(income[1].categories[0].name, NO_CATEGORY);
    assert_eq!(income[1].categories[0].id, 0);

    let only_food = reports
        .list_expenses(&own(), &[CategoryId::new(5)], day(1), day(31))
        .unwrap();
    assert_eq!(only_food[0].categories.len(), 1);
}

#[test]
fn test_category_transfer_listings() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = CategoryReports::new(&context);
    let checking = [AccountId::new(CHECKING)];

    let out = reports.list_transferred_out(&checking, &[], day(1), day(31)).unwrap();
    assert_eq!(out[0].categories[0].transaction_journals[0].amount, exact(dec!(-300)));

    let into = reports.list_transferred_in(&checking, &[], day(1), day(31)).unwrap();
    assert!(into.is_empty());
}

#[test]
fn test_category_sums() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = CategoryReports::new(&context);

    let by_category = reports.sum_by_category(&own(), day(1), day(31)).unwrap();
    assert_eq!(by_category.len(), 2);
    assert_eq!(by_category[0].name.as_deref(), Some("Food"));

    // uncategorised USD deposit is not counted
    let income = reports.sum_income(&own(), &[], day(1), day(31)).unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].sum, "2500");

    let transfers = reports.sum_transfers(&own(), &[], day(1), day(31)).unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].sum, "300");
}

#[test]
fn test_sum_collected_by_category_overrides_preference() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let records = ledger
        .journals(&JournalFilter::new(day(1), day(31)))
        .unwrap();

    let sums = CategoryReports::new(&context)
        .sum_collected_by_category(&records, CategoryId::new(9), SignMode::Negative, false)
        .unwrap();

    // the USD leg of the transfer is ignored
    assert_eq!(sums.len(), 1);
    assert_eq!(sums[0].sum, "-300");
    assert_eq!(sums[0].currency_code, "EUR");
}

#[test]
fn test_budget_sums() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = BudgetReports::new(&context);

    let by_budget = reports.sum_by_budget(&own(), day(1), day(31)).unwrap();
    assert_eq!(by_budget.len(), 1);
    assert_eq!(by_budget[0].name.as_deref(), Some("Living"));
    assert_eq!(by_budget[0].sum_float.to_string(), "-35.01");

    let records = ledger.journals(&JournalFilter::new(day(1), day(31))).unwrap();
    let collected = reports
        .sum_collected_by_budget(&records, BudgetId::new(7), true)
        .unwrap();
    assert_eq!(collected[0].sum, "-35.010");

    let first_week = reports
        .sum_collected_expenses(&records, day(1), day(7), eur().id, false)
        .unwrap();
    // journals 1, 3 and 4; only date and currency are checked
    assert_eq!(first_week[0].count, 3);
}

#[test]
fn test_tag_income() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));
    let reports = TagReports::new(&context);

    let tagged = reports.income_by_tag(&own(), &[], day(1), day(31)).unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, Some(2));
    assert_eq!(tagged[0].difference, "2500");

    let untagged = reports.income_without_tag(&own(), day(1), day(31)).unwrap();
    assert_eq!(untagged.len(), 1);
    assert_eq!(untagged[0].currency.currency_code, "EUR");
    assert_eq!(untagged[0].difference, "90");

    let weekly = reports
        .sum_expenses_by_tag(&own(), &[TagId::new(1)], day(1), day(31))
        .unwrap();
    assert_eq!(weekly[0].sum, "-20.005");
}

#[test]
fn test_insight_totals() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let reports = InsightReports::new(&context);

    let expenses = reports.expense_total(&own(), day(1), day(31)).unwrap();
    assert_eq!(expenses[0].difference, "-835.010");
    assert_eq!(expenses[0].difference_float.to_string(), "-835.01");

    // the foreign EUR leg of the USD deposit is ignored when not converting
    let income = reports.income_total(&own(), day(1), day(31)).unwrap();
    let totals: Vec<(&str, &str)> = income
        .iter()
        .map(|e| (e.currency.currency_code.as_str(), e.difference.as_str()))
        .collect();
    assert_eq!(totals, [("EUR", "2500"), ("USD", "100")]);

    let transfers = reports.transfer_total(&own(), day(1), day(31)).unwrap();
    assert_eq!(transfers[0].difference, "300");
}

#[test]
fn test_income_expense_chart() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));

    let datasets = ChartReports::new(&context)
        .income_expense(&[AccountId::new(CHECKING)], day(1), day(7))
        .unwrap();

    assert_eq!(datasets.len(), 2);
    let earned = &datasets[0];
    assert_eq!(earned.label, FlowKind::Earned);
    assert_eq!(earned.series.entries.len(), 7);
    assert_eq!(earned.series.entries["2024-01-01"], dec!(2500));

    let spent = &datasets[1];
    assert_eq!(spent.series.entries["2024-01-03"].to_string(), "-20.01");
    assert_eq!(spent.series.entries["2024-01-05"], dec!(-800));
    assert_eq!(spent.series.pc_entries["2024-01-02"], Decimal::ZERO);
}

#[test]
fn test_account_balance_chart() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), false));
    let charts = ChartReports::new(&context);

    let series = charts
        .account_balance(AccountId::new(CHECKING), day(1), day(6))
        .unwrap();
    assert_eq!(series.len(), 1);
    let values: Vec<String> = series[0].entries.values().map(ToString::to_string).collect();
    assert_eq!(values, ["2500.00", "2500.00", "2500.00", "2500.00", "1679.99", "1679.99"]);

    assert!(matches!(
        charts.account_balance(AccountId::new(99), day(1), day(6)),
        Err(ReportError::AccountNotFound(_))
    ));
}

#[test]
fn test_empty_range_is_empty() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let context = ReportContext::new(&ledger, &directory, &provider, ConversionPolicy::new(eur(), true));

    assert!(InsightReports::new(&context)
        .expense_total(&own(), day(31), day(1))
        .unwrap()
        .is_empty());
    assert!(ChartReports::new(&context)
        .income_expense(&own(), day(31), day(1))
        .unwrap()
        .is_empty());
}

#[test]
fn test_context_from_config() {
    let (ledger, directory, provider) = (ledger(), directory(), rates());
    let config = tally_shared::config::ReportingConfig {
        primary_currency: "usd".to_string(),
        convert_to_primary: true,
        ..Default::default()
    };

    let context = ReportContext::from_config(&config, &ledger, &directory, &provider).unwrap();
    assert_eq!(context.policy().primary().id, CurrencyId::new(2));

    let unknown = tally_shared::config::ReportingConfig {
        primary_currency: "XYZ".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        ReportContext::from_config(&unknown, &ledger, &directory, &provider),
        Err(ReportError::Currency(_))
    ));
}

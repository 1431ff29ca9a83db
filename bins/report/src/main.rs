//! Tally report runner
//!
//! Loads a ledger export, runs every report over it and prints the results
//! as JSON.
//!
//! ```text
//! tally-report <export.json>
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::currency::{
    ConverterStats, CurrencyInfo, ExchangeRate, InMemoryCurrencyDirectory, InMemoryRateProvider,
};
use tally_core::reports::{
    AccountReport, AccountReports, ChartReports, DifferenceEntry, InMemoryLedger, InsightReports,
    ReportContext, ReportError, TransferEntry,
};
use tally_core::series::{BalanceSnapshot, ChartDataset, PeriodSeries};
use tally_core::transaction::TransactionRecord;
use tally_shared::AppConfig;
use tally_shared::types::AccountId;

/// Everything a report run needs, as exported from the ledger.
#[derive(Debug, Deserialize)]
struct LedgerExport {
    start: NaiveDate,
    end: NaiveDate,
    /// Asset accounts the reports are about.
    accounts: Vec<AccountId>,
    currencies: Vec<CurrencyInfo>,
    #[serde(default)]
    rates: Vec<ExchangeRate>,
    transactions: Vec<TransactionRecord>,
    #[serde(default)]
    balances: Vec<AccountBalances>,
}

#[derive(Debug, Deserialize)]
struct AccountBalances {
    account_id: AccountId,
    snapshots: Vec<BalanceSnapshot>,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    expenses: AccountReport,
    income: AccountReport,
    transfers: Vec<TransferEntry>,
    expense_total: Vec<DifferenceEntry>,
    income_total: Vec<DifferenceEntry>,
    transfer_total: Vec<DifferenceEntry>,
    income_expense: Vec<ChartDataset>,
    balances: Vec<PeriodSeries>,
    converter: ConverterStats,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: tally-report <export.json>")?;
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let export: LedgerExport = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(
        transactions = export.transactions.len(),
        currencies = export.currencies.len(),
        rates = export.rates.len(),
        start = %export.start,
        end = %export.end,
        "Loaded ledger export"
    );

    let directory = InMemoryCurrencyDirectory::new(export.currencies);
    let provider = InMemoryRateProvider::new(export.rates);
    let ledger = export.balances.into_iter().fold(
        InMemoryLedger::new(export.transactions),
        |ledger, entry| ledger.with_balances(entry.account_id, entry.snapshots),
    );
    let context = ReportContext::from_config(&config.reporting, &ledger, &directory, &provider)?;

    let output = run(&context, &export.accounts, export.start, export.end)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn run(
    context: &ReportContext<'_>,
    accounts: &[AccountId],
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<ReportOutput> {
    let account_reports = AccountReports::new(context);
    let insight = InsightReports::new(context);
    let charts = ChartReports::new(context);

    let mut balances = Vec::new();
    for account in accounts {
        match charts.account_balance(*account, start, end) {
            Ok(series) => balances.extend(series),
            Err(ReportError::AccountNotFound(_)) => warn!(%account, "No balances exported, skipping"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(ReportOutput {
        expenses: account_reports.expense_report(accounts, start, end)?,
        income: account_reports.income_report(accounts, start, end)?,
        transfers: account_reports.transfers(accounts, start, end)?,
        expense_total: insight.expense_total(accounts, start, end)?,
        income_total: insight.income_total(accounts, start, end)?,
        transfer_total: insight.transfer_total(accounts, start, end)?,
        income_expense: charts.income_expense(accounts, start, end)?,
        balances,
        converter: context.finish(),
    })
}

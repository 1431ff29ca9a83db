//! Reporting façades.
//!
//! Each façade borrows a [`ReportContext`], asks the ledger for records,
//! aggregates them and shapes the output:
//! - Account: sums per opposing account, transfers, journal listings
//! - Category and budget: listings and grouped sums
//! - Tag and insight: period totals
//! - Chart: income/expense and balance series

pub mod account;
pub mod budget;
pub mod category;
pub mod chart;
pub mod context;
pub mod error;
pub mod insight;
pub mod query;
pub mod tag;
pub mod types;

#[cfg(test)]
mod tests;

pub use account::AccountReports;
pub use budget::BudgetReports;
pub use category::{CategoryReports, NO_CATEGORY};
pub use chart::ChartReports;
pub use context::ReportContext;
pub use error::ReportError;
pub use insight::InsightReports;
pub use query::{InMemoryLedger, JournalFilter, TransactionQuery};
pub use tag::TagReports;
pub use types::*;

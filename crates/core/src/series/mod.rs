//! Fixed-step time series for charts.
//!
//! Two flavours share one output shape:
//! - balance series carry the last known balance forward
//! - flow series sum what happened inside each period
//!
//! Values accumulate exactly and are rounded once, when an entry is
//! written. A rounded value too large for a chart entry is an error, never
//! a panic.

pub mod balance;
pub mod error;
pub mod flow;
pub mod period;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{narrow, plain};

use crate::currency::{CurrencyInfo, round_for_currency};

pub use balance::{BalanceSeriesBuilder, BalanceSnapshot};
pub use error::SeriesError;
pub use flow::{ChartDataset, FlowKind, FlowSeriesBuilder};
pub use period::{Period, PeriodWindow};

/// One currency's values per period label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSeries {
    /// Currency of `entries`.
    pub currency: CurrencyInfo,
    /// Currency of `pc_entries`, when converting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<CurrencyInfo>,
    /// Step.
    pub period: Period,
    /// Requested start.
    pub start: NaiveDate,
    /// Requested end.
    pub end: NaiveDate,
    /// Native values, rounded to `currency`.
    pub entries: IndexMap<String, Decimal>,
    /// Primary currency values, rounded to `primary`; empty when not converting.
    pub pc_entries: IndexMap<String, Decimal>,
}

impl PeriodSeries {
    /// Creates a series without entries.
    #[must_use]
    pub fn new(
        currency: CurrencyInfo,
        primary: Option<CurrencyInfo>,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            currency,
            primary,
            period,
            start,
            end,
            entries: IndexMap::new(),
            pc_entries: IndexMap::new(),
        }
    }
}

/// Rounds an exact value for `currency` and narrows it to an entry.
fn entry_value(value: &BigDecimal, currency: &CurrencyInfo) -> Result<Decimal, SeriesError> {
    let rounded = round_for_currency(value, currency);
    narrow(&rounded).ok_or_else(|| SeriesError::Overflow {
        currency: currency.code.clone(),
        value: plain(&rounded),
    })
}

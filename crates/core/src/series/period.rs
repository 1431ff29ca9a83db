//! Fixed reporting periods and their boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::SeriesError;

/// Step of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// One calendar day.
    #[serde(alias = "1D")]
    Day,
    /// ISO week, Monday to Sunday.
    #[serde(alias = "1W")]
    Week,
    /// Calendar month.
    #[serde(alias = "1M")]
    Month,
    /// Calendar quarter.
    #[serde(alias = "3M")]
    Quarter,
    /// January-June or July-December.
    #[serde(alias = "6M")]
    HalfYear,
    /// Calendar year.
    #[serde(alias = "1Y")]
    Year,
}

/// One step of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period; the instant the period represents.
    pub end: NaiveDate,
    /// Label, e.g. "2024-01" or "2024-W03".
    pub label: String,
}

impl PeriodWindow {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl Period {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::HalfYear => "half_year",
            Self::Year => "year",
        }
    }

    /// Picks a step that keeps a chart readable for the given range.
    ///
    /// More than 3 months: weeks. More than 24: months. More than 100:
    /// years. Otherwise days.
    #[must_use]
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        let months = months_between(start, end);
        if months > 100 {
            Self::Year
        } else if months > 24 {
            Self::Month
        } else if months > 3 {
            Self::Week
        } else {
            Self::Day
        }
    }

    /// First day of the period containing `date`.
    #[must_use]
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Self::Month => first_of_month(date, date.month()),
            Self::Quarter => first_of_month(date, (date.month0() / 3) * 3 + 1),
            Self::HalfYear => first_of_month(date, (date.month0() / 6) * 6 + 1),
            Self::Year => first_of_month(date, 1),
        }
    }

    /// Last day of the period containing `date`.
    #[must_use]
    pub fn end_of(&self, date: NaiveDate) -> NaiveDate {
        let start = self.start_of(date);
        let next = match self {
            Self::Day => start.checked_add_days(Days::new(1)),
            Self::Week => start.checked_add_days(Days::new(7)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Quarter => start.checked_add_months(Months::new(3)),
            Self::HalfYear => start.checked_add_months(Months::new(6)),
            Self::Year => start.checked_add_months(Months::new(12)),
        };
        next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
    }

    /// Label of the period containing `date`.
    #[must_use]
    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => date.format("%G-W%V").to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
            Self::HalfYear => format!("{}-H{}", date.year(), date.month0() / 6 + 1),
            Self::Year => date.format("%Y").to_string(),
        }
    }

    /// Ordered periods covering `start..=end`.
    ///
    /// The first window may begin before `start` and the last may end after
    /// `end`; windows always span whole periods. Empty when `start > end`.
    #[must_use]
    pub fn windows(&self, start: NaiveDate, end: NaiveDate) -> Vec<PeriodWindow> {
        let mut windows = Vec::new();
        let mut cursor = self.start_of(start);

        while start <= end && cursor <= end {
            let window_end = self.end_of(cursor);
            windows.push(PeriodWindow {
                start: cursor,
                end: window_end,
                label: self.label(cursor),
            });
            match window_end.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }

        windows
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "1d" => Ok(Self::Day),
            "week" | "1w" => Ok(Self::Week),
            "month" | "1m" => Ok(Self::Month),
            "quarter" | "3m" => Ok(Self::Quarter),
            "half_year" | "6m" => Ok(Self::HalfYear),
            "year" | "1y" => Ok(Self::Year),
            _ => Err(SeriesError::UnknownPeriod(s.to_string())),
        }
    }
}

fn first_of_month(date: NaiveDate, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Whole months from `start` to `end` (negative when reversed).
fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let mut months = i64::from(end.year() - start.year()) * 12
        + i64::from(end.month()) - i64::from(start.month());
    if end.day() < start.day() {
        months -= 1;
    }
    months
}

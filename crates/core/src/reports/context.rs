//! Per-request reporting context.

use tally_shared::config::ReportingConfig;
use tracing::debug;

use super::error::ReportError;
use super::query::{JournalFilter, TransactionQuery};
use crate::currency::{ConverterStats, CurrencyDirectory, ExchangeRateConverter, RateProvider};
use crate::policy::ConversionPolicy;
use crate::series::{BalanceSeriesBuilder, FlowSeriesBuilder};
use crate::summary::TransactionSummarizer;
use crate::transaction::TransactionRecord;

/// Everything one report request needs.
///
/// Owns the request's policy and rate cache; borrows the ledger, the
/// currency directory and the rate provider. Build one per request.
pub struct ReportContext<'a> {
    ledger: &'a dyn TransactionQuery,
    directory: &'a dyn CurrencyDirectory,
    policy: ConversionPolicy,
    converter: ExchangeRateConverter<'a>,
}

impl<'a> ReportContext<'a> {
    /// Creates a context with an explicit policy.
    #[must_use]
    pub fn new(
        ledger: &'a dyn TransactionQuery,
        directory: &'a dyn CurrencyDirectory,
        provider: &'a dyn RateProvider,
        policy: ConversionPolicy,
    ) -> Self {
        Self {
            ledger,
            directory,
            policy,
            converter: ExchangeRateConverter::new(provider),
        }
    }

    /// Creates a context from configuration defaults.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Currency` if the configured primary currency is
    /// unknown.
    pub fn from_config(
        config: &ReportingConfig,
        ledger: &'a dyn TransactionQuery,
        directory: &'a dyn CurrencyDirectory,
        provider: &'a dyn RateProvider,
    ) -> Result<Self, ReportError> {
        let policy = ConversionPolicy::from_config(config, directory)?;
        debug!(
            primary = %policy.primary().code,
            convert_to_primary = policy.convert_to_primary(),
            "Report context created"
        );
        Ok(Self {
            ledger,
            directory,
            policy,
            converter: ExchangeRateConverter::with_capacity(provider, config.rate_cache_capacity),
        })
    }

    /// The request's policy.
    #[must_use]
    pub const fn policy(&self) -> &ConversionPolicy {
        &self.policy
    }

    /// The request's converter.
    #[must_use]
    pub const fn converter(&self) -> &ExchangeRateConverter<'a> {
        &self.converter
    }

    /// The currency directory.
    #[must_use]
    pub fn directory(&self) -> &'a dyn CurrencyDirectory {
        self.directory
    }

    /// Summarizer under the request's policy.
    #[must_use]
    pub fn summarizer(&self) -> TransactionSummarizer<'_> {
        TransactionSummarizer::new(&self.policy, &self.converter)
    }

    /// Flow series builder under the request's policy.
    #[must_use]
    pub fn flow_builder(&self) -> FlowSeriesBuilder<'_> {
        FlowSeriesBuilder::new(&self.policy, &self.converter)
    }

    /// Balance series builder under the request's policy.
    #[must_use]
    pub fn balance_builder(&self) -> BalanceSeriesBuilder<'_> {
        BalanceSeriesBuilder::new(self.directory, &self.policy, &self.converter)
    }

    /// Runs a ledger query.
    ///
    /// # Errors
    ///
    /// Returns whatever the ledger reports.
    pub fn journals(&self, filter: &JournalFilter) -> Result<Vec<TransactionRecord>, ReportError> {
        let records = self.ledger.journals(filter)?;
        debug!(records = records.len(), start = %filter.start, end = %filter.end, "Collected journals");
        Ok(records)
    }

    /// The ledger.
    #[must_use]
    pub fn ledger(&self) -> &'a dyn TransactionQuery {
        self.ledger
    }

    /// Logs and returns the converter counters.
    pub fn finish(&self) -> ConverterStats {
        self.converter.summarize()
    }
}

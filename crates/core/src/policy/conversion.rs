//! Currency attribution for a single record.
//!
//! With conversion off, a record is counted in its native currency and its
//! foreign leg (if any) is counted separately in the foreign currency.
//!
//! With conversion on, everything lands in the primary currency:
//! 1. Native currency is primary: native amount, no rate lookup
//! 2. Foreign currency is primary: foreign amount
//! 3. Otherwise: `pc_amount` if the ledger supplied one, else the native
//!    amount converted at the record's date

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tally_shared::config::ReportingConfig;
use tracing::trace;

use crate::currency::{CurrencyDirectory, CurrencyError, CurrencyInfo, ExchangeRateConverter};
use crate::transaction::{RecordError, TransactionRecord};

/// Which record field an amount was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSource {
    /// `amount`.
    Native,
    /// `foreign_amount`.
    Foreign,
    /// `pc_amount`.
    PrimaryConverted,
    /// `amount` converted through the exchange rate converter.
    Converted,
}

/// An unsigned amount attributed to a currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLeg {
    /// Attribution currency.
    pub currency: CurrencyInfo,
    /// Amount as read (sign not yet applied).
    pub amount: BigDecimal,
    /// Field the amount came from.
    pub source: AmountSource,
}

/// Result of applying the policy to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    /// The leg every grouping counts.
    pub main: ResolvedLeg,
    /// Separate foreign leg; only set when not converting.
    pub foreign: Option<ResolvedLeg>,
}

impl ResolvedRecord {
    /// Iterates the contributing legs.
    pub fn legs(&self, include_foreign: bool) -> impl Iterator<Item = &ResolvedLeg> {
        std::iter::once(&self.main).chain(self.foreign.iter().filter(move |_| include_foreign))
    }
}

/// Primary currency plus the convert flag for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPolicy {
    primary: CurrencyInfo,
    convert_to_primary: bool,
}

impl ConversionPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(primary: CurrencyInfo, convert_to_primary: bool) -> Self {
        Self {
            primary,
            convert_to_primary,
        }
    }

    /// Builds the default policy from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::UnknownCode` if the configured primary
    /// currency is not in the directory.
    pub fn from_config(
        config: &ReportingConfig,
        directory: &dyn CurrencyDirectory,
    ) -> Result<Self, CurrencyError> {
        let primary = directory.resolve_code(&config.primary_currency)?;
        Ok(Self::new(primary, config.convert_to_primary))
    }

    /// Same primary currency, explicit convert flag.
    ///
    /// Used by callers that must ignore the user's preference.
    #[must_use]
    pub fn ignoring_preferences(&self, convert_to_primary: bool) -> Self {
        Self::new(self.primary.clone(), convert_to_primary)
    }

    /// The request's primary currency.
    #[must_use]
    pub const fn primary(&self) -> &CurrencyInfo {
        &self.primary
    }

    /// Whether amounts are converted into the primary currency.
    #[must_use]
    pub const fn convert_to_primary(&self) -> bool {
        self.convert_to_primary
    }

    /// Whether resolving this record will need an exchange rate.
    #[must_use]
    pub fn needs_rate(&self, record: &TransactionRecord) -> bool {
        self.convert_to_primary
            && record.currency_id != self.primary.id
            && record.foreign_currency_id != Some(self.primary.id)
            && record.pc_amount.is_none()
    }

    /// Resolves attribution currency and amount for a record.
    ///
    /// The converter is only consulted when neither leg is in the primary
    /// currency and the record has no `pc_amount`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the record's foreign leg is malformed.
    pub fn resolve(
        &self,
        record: &TransactionRecord,
        converter: &ExchangeRateConverter<'_>,
    ) -> Result<ResolvedRecord, RecordError> {
        let native = record.native_currency();
        let foreign = record.foreign_leg()?;

        if !self.convert_to_primary {
            // A foreign leg in the native currency would be counted twice.
            let extra = foreign
                .filter(|(currency, _)| currency.id != native.id)
                .map(|(currency, amount)| {
                    trace!(
                        journal_id = %record.journal_id,
                        foreign = %currency.code,
                        "Record also contributes its foreign amount"
                    );
                    ResolvedLeg {
                        currency,
                        amount,
                        source: AmountSource::Foreign,
                    }
                });
            return Ok(ResolvedRecord {
                main: ResolvedLeg {
                    currency: native,
                    amount: record.amount.clone(),
                    source: AmountSource::Native,
                },
                foreign: extra,
            });
        }

        if native.id == self.primary.id {
            return Ok(ResolvedRecord {
                main: ResolvedLeg {
                    currency: native,
                    amount: record.amount.clone(),
                    source: AmountSource::Native,
                },
                foreign: None,
            });
        }

        let (amount, source) = match foreign {
            Some((currency, amount)) if currency.id == self.primary.id => {
                (amount, AmountSource::Foreign)
            }
            _ => match &record.pc_amount {
                Some(pc_amount) => (pc_amount.clone(), AmountSource::PrimaryConverted),
                None => (
                    converter.convert(&record.amount, &native, &self.primary, record.as_of()),
                    AmountSource::Converted,
                ),
            },
        };
        trace!(
            journal_id = %record.journal_id,
            native = %native.code,
            ?source,
            "Record switches to primary currency"
        );

        Ok(ResolvedRecord {
            main: ResolvedLeg {
                currency: self.primary.clone(),
                amount,
                source,
            },
            foreign: None,
        })
    }
}

//! Request-scoped exchange rate converter.
//!
//! Wraps a [`RateProvider`] with a memoizing Moka cache. One converter is
//! built per request and dropped with it; rates are never shared across
//! requests.

use std::sync::atomic::{AtomicU64, Ordering};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use moka::sync::Cache;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::CurrencyId;
use tracing::{debug, warn};

use super::conversion::convert_amount;
use super::directory::CurrencyInfo;
use super::exchange::RateProvider;

/// Default cache capacity (number of currency-pair/date entries).
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

type RateKey = (CurrencyId, CurrencyId, NaiveDate);

/// Counters reported by [`ExchangeRateConverter::summarize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConverterStats {
    /// Calls to `rate` / `convert`.
    pub lookups: u64,
    /// Lookups answered from the cache.
    pub cache_hits: u64,
    /// Calls made to the underlying provider.
    pub provider_calls: u64,
    /// Provider failures that fell back to a rate of 1.
    pub fallbacks: u64,
}

/// Memoizing exchange rate resolver.
///
/// Safe for concurrent reads. A rate is fetched at most once per
/// `(from, to, date)`; concurrent first lookups of the same key wait for a
/// single provider call.
pub struct ExchangeRateConverter<'a> {
    provider: &'a dyn RateProvider,
    cache: Cache<RateKey, Decimal>,
    lookups: AtomicU64,
    cache_hits: AtomicU64,
    provider_calls: AtomicU64,
    fallbacks: AtomicU64,
}

impl<'a> ExchangeRateConverter<'a> {
    /// Creates a converter with the default cache capacity.
    #[must_use]
    pub fn new(provider: &'a dyn RateProvider) -> Self {
        Self::with_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a converter holding at most `max_capacity` rates.
    #[must_use]
    pub fn with_capacity(provider: &'a dyn RateProvider, max_capacity: u64) -> Self {
        Self {
            provider,
            cache: Cache::builder().max_capacity(max_capacity).build(),
            lookups: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            provider_calls: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Returns the rate converting one unit of `from` into `to` at `date`.
    ///
    /// Identical currencies return 1 without touching the provider. A
    /// provider failure is logged and answered with 1; it never fails the
    /// caller.
    pub fn rate(&self, from: &CurrencyInfo, to: &CurrencyInfo, date: NaiveDate) -> Decimal {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if from.id == to.id {
            return Decimal::ONE;
        }

        let (rate, fresh) = self.cached_rate(from, to, date);
        if !fresh {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        rate
    }

    /// Converts `amount` from one currency into another at `date`.
    ///
    /// The result is not rounded.
    pub fn convert(
        &self,
        amount: &BigDecimal,
        from: &CurrencyInfo,
        to: &CurrencyInfo,
        date: NaiveDate,
    ) -> BigDecimal {
        convert_amount(amount, self.rate(from, to, date))
    }

    /// Warms the cache for every distinct `(currency, date)` pair in parallel.
    ///
    /// Pairs already denominated in `to` are skipped. Warm-up does not count
    /// as lookups.
    pub fn prepare<'c, I>(&self, pairs: I, to: &CurrencyInfo)
    where
        I: IntoIterator<Item = (&'c CurrencyInfo, NaiveDate)>,
    {
        let mut distinct: Vec<(&CurrencyInfo, NaiveDate)> = pairs
            .into_iter()
            .filter(|(from, _)| from.id != to.id)
            .collect();
        distinct.sort_by_key(|(from, date)| (from.id, *date));
        distinct.dedup_by_key(|(from, date)| (from.id, *date));

        debug!(
            pairs = distinct.len(),
            target = %to.code,
            "Preparing exchange rate cache"
        );

        distinct.par_iter().for_each(|(from, date)| {
            self.cached_rate(from, to, *date);
        });
    }

    /// Returns the counters collected so far and logs them.
    pub fn summarize(&self) -> ConverterStats {
        let stats = self.snapshot();
        debug!(
            lookups = stats.lookups,
            cache_hits = stats.cache_hits,
            provider_calls = stats.provider_calls,
            fallbacks = stats.fallbacks,
            "Exchange rate converter summary"
        );
        stats
    }

    /// Returns `(rate, fresh)`; `fresh` is true when the provider was asked.
    fn cached_rate(&self, from: &CurrencyInfo, to: &CurrencyInfo, date: NaiveDate) -> (Decimal, bool) {
        let entry = self
            .cache
            .entry((from.id, to.id, date))
            .or_insert_with(|| self.fetch(from, to, date));
        let fresh = entry.is_fresh();
        (entry.into_value(), fresh)
    }

    fn fetch(&self, from: &CurrencyInfo, to: &CurrencyInfo, date: NaiveDate) -> Decimal {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
        match self.provider.find_rate(from, to, date) {
            Ok(rate) => rate,
            Err(err) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    from = %from.code,
                    to = %to.code,
                    %date,
                    error = %err,
                    "No exchange rate available, using 1"
                );
                Decimal::ONE
            }
        }
    }
}

impl std::fmt::Debug for ExchangeRateConverter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRateConverter")
            .field("cached_rates", &self.cache.entry_count())
            .field("stats", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl ExchangeRateConverter<'_> {
    fn snapshot(&self) -> ConverterStats {
        ConverterStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

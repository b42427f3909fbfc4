//! Exchange-rate handling.
//!
//! Everything multi-currency in the reports is expressed in USD, so the
//! whole crate needs exactly one rate: how many BWP one USD buys. The rate
//! is best-effort; a missing or broken rate never blocks a report, it
//! degrades to the last known value or to [`FALLBACK_BWP_PER_USD`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Currency, MoneyMinor};

/// Rate used when no usable exchange rate is available at all.
pub const FALLBACK_BWP_PER_USD: f64 = 13.5;

/// A dated BWP-per-USD exchange rate: 1 USD = `rate` BWP.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub rate: f64,
    pub as_of: NaiveDate,
}

impl ExchangeRate {
    /// The rate actually used for conversion.
    ///
    /// A non-finite or non-positive stored rate would poison every derived
    /// USD equivalent, so it is substituted with the fixed fallback here.
    #[must_use]
    pub fn effective(self) -> f64 {
        sanitize_rate(self.rate)
    }
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        FALLBACK_BWP_PER_USD
    }
}

/// Converts an amount to USD **minor units** (as `f64`, since BWP amounts
/// divide by a decimal rate).
///
/// USD passes through unchanged; BWP divides by the effective rate. The
/// result is always finite.
#[must_use]
pub fn to_usd_minor(amount: MoneyMinor, currency: Currency, rate: f64) -> f64 {
    match currency {
        Currency::Usd => amount.minor() as f64,
        Currency::Bwp => amount.minor() as f64 / sanitize_rate(rate),
    }
}

/// Session-scoped exchange-rate state.
///
/// Holds the last usable rate plus a flag telling the caller whether the
/// most recent fetch attempt failed. Fetching itself lives at the server
/// boundary; this type only records outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateCache {
    pub current: ExchangeRate,
    pub fetch_failed: bool,
}

impl RateCache {
    /// Starts from the fixed fallback rate, dated `as_of`.
    #[must_use]
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            current: ExchangeRate {
                rate: FALLBACK_BWP_PER_USD,
                as_of,
            },
            fetch_failed: false,
        }
    }

    /// Records a successful fetch. Unusable values (non-finite, `<= 0`) are
    /// treated as a failed fetch and keep the previous rate.
    pub fn apply_fetch(&mut self, rate: f64, as_of: NaiveDate) {
        if rate.is_finite() && rate > 0.0 {
            self.current = ExchangeRate { rate, as_of };
            self.fetch_failed = false;
        } else {
            self.fetch_failed = true;
        }
    }

    /// Records a failed fetch attempt. The previous rate stays in force.
    pub fn fetch_failed(&mut self) {
        self.fetch_failed = true;
    }

    /// Manual override, e.g. from the rate endpoint. Clears the failure
    /// flag; unusable values are rejected by returning `false`.
    pub fn apply_override(&mut self, rate: f64, as_of: NaiveDate) -> bool {
        if rate.is_finite() && rate > 0.0 {
            self.current = ExchangeRate { rate, as_of };
            self.fetch_failed = false;
            true
        } else {
            false
        }
    }

    /// The rate to convert with right now.
    #[must_use]
    pub fn effective(&self) -> f64 {
        self.current.effective()
    }
}

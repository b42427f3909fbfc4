use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency of a stored amount.
///
/// The set is closed: the team books expenses in US dollars or Botswana pula,
/// and every multi-currency total is expressed in USD (the common reporting
/// currency). Amounts are stored as an `i64` number of **minor units** (see
/// `MoneyMinor`); both currencies use 2 fraction digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Bwp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Bwp => "BWP",
        }
    }

    /// Display symbol used in formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Bwp => "P",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Bwp => 2,
        }
    }

    /// Lenient parser for stored/imported codes.
    ///
    /// Anything that is not recognized (including `None`) is treated as USD.
    /// This mirrors the behavior the reporting slice has always had; a
    /// malformed row degrades to a USD amount instead of blocking the view.
    #[must_use]
    pub fn from_code_lossy(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.trim().eq_ignore_ascii_case("BWP") => Currency::Bwp,
            _ => Currency::Usd,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "BWP" => Ok(Currency::Bwp),
            other => Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_accepts_known_codes() {
        assert_eq!(Currency::try_from("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" BWP ").unwrap(), Currency::Bwp);
        assert!(Currency::try_from("EUR").is_err());
    }

    #[test]
    fn lossy_parse_defaults_to_usd() {
        assert_eq!(Currency::from_code_lossy(None), Currency::Usd);
        assert_eq!(Currency::from_code_lossy(Some("bwp")), Currency::Bwp);
        assert_eq!(Currency::from_code_lossy(Some("ZAR")), Currency::Usd);
        assert_eq!(Currency::from_code_lossy(Some("")), Currency::Usd);
    }
}

//! Type-safe price representation using decimal arithmetic.
//!
//! The backend sends prices as JSON numbers; they are held as
//! [`Decimal`] so that cart totals never accumulate floating-point error.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., roubles, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display with two decimal places (e.g., `1500.00 руб.`, `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Symbol::Prefix(symbol) => format!("{symbol}{amount:.2}"),
            Symbol::Suffix(symbol) => format!("{amount:.2} {symbol}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

enum Symbol {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl CurrencyCode {
    const fn symbol(self) -> Symbol {
        match self {
            Self::RUB => Symbol::Suffix("руб."),
            Self::USD | Self::CAD | Self::AUD => Symbol::Prefix("$"),
            Self::EUR => Symbol::Prefix("€"),
            Self::GBP => Symbol::Prefix("£"),
        }
    }
}

/// A currency code this client cannot display.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Self::RUB),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rub_suffix() {
        let price = Price::new(Decimal::new(1500, 0), CurrencyCode::RUB);
        assert_eq!(price.display(), "1500.00 руб.");
    }

    #[test]
    fn test_display_prefix_symbols() {
        assert_eq!(
            Price::new(Decimal::new(1999, 2), CurrencyCode::USD).to_string(),
            "$19.99"
        );
        assert_eq!(
            Price::new(Decimal::new(5, 1), CurrencyCode::EUR).to_string(),
            "€0.50"
        );
    }

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::GBP);
        assert_eq!(price.display(), "£10.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("rub".parse::<CurrencyCode>().unwrap(), CurrencyCode::RUB);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
        assert_eq!(CurrencyCode::default(), CurrencyCode::RUB);
    }
}

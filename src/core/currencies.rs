//! Document currencies.
//!
//! Issuance is limited to soles and US dollars; anything else is rejected
//! when parsed rather than carried through as a free-form string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ComprobanteError;

/// ISO 4217 currency of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    /// Peruvian sol.
    #[default]
    #[serde(rename = "PEN")]
    Pen,
    /// US dollar.
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pen => "PEN",
            Self::Usd => "USD",
        }
    }

    /// Symbol used on printed representations.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Pen => "S/.",
            Self::Usd => "$",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ComprobanteError> {
        match code.trim() {
            "PEN" => Ok(Self::Pen),
            "USD" => Ok(Self::Usd),
            other => Err(ComprobanteError::InvalidCurrency(other.to_string())),
        }
    }
}

impl FromStr for Currency {
    type Err = ComprobanteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies() {
        assert_eq!(Currency::from_code("PEN").unwrap(), Currency::Pen);
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(Currency::default(), Currency::Pen);
    }

    #[test]
    fn unknown_currencies() {
        assert!(matches!(
            Currency::from_code("EUR"),
            Err(ComprobanteError::InvalidCurrency(c)) if c == "EUR"
        ));
        assert!(Currency::from_code("").is_err());
        assert!(Currency::from_code("pen").is_err());
    }

    #[test]
    fn symbols() {
        assert_eq!(Currency::Pen.symbol(), "S/.");
        assert_eq!(Currency::Usd.symbol(), "$");
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point monetary amount stored in minor units (pence).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

/// Failure to read a decimal price string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePriceError {
    #[error("price is empty")]
    Empty,
    #[error("'{0}' is not a decimal amount")]
    Invalid(String),
    #[error("'{0}' is out of range")]
    Overflow(String),
}

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Take `percent` off, rounding half away from zero to the nearest penny.
    pub fn discounted(self, percent: i64) -> Price {
        let scaled = self.0.saturating_mul(100 - percent);
        let quotient = scaled / 100;
        let remainder = scaled % 100;
        if remainder.abs() * 2 >= 100 {
            Price(quotient + scaled.signum())
        } else {
            Price(quotient)
        }
    }

    /// Amount prefixed with the pound sign, e.g. `£25.00`.
    pub fn formatted(self) -> String {
        format!("£{self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParsePriceError::Empty);
        }
        let invalid = || ParsePriceError::Invalid(trimmed.to_string());
        let overflow = || ParsePriceError::Overflow(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut minor: i64 = 0;
        for digit in whole.bytes() {
            minor = minor
                .checked_mul(10)
                .and_then(|value| value.checked_add(i64::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }
        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let pence = digits.next().unwrap_or(0) * 10 + digits.next().unwrap_or(0);
        let round_up = digits.next().map(|d| d >= 5).unwrap_or(false);

        minor = minor
            .checked_mul(100)
            .and_then(|value| value.checked_add(pence + i64::from(round_up)))
            .ok_or_else(overflow)?;

        Ok(Price(if negative { -minor } else { minor }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("25".parse::<Price>(), Ok(Price::from_minor(2500)));
        assert_eq!("25.5".parse::<Price>(), Ok(Price::from_minor(2550)));
        assert_eq!(" 25.00 ".parse::<Price>(), Ok(Price::from_minor(2500)));
        assert_eq!(".75".parse::<Price>(), Ok(Price::from_minor(75)));
        assert_eq!("-1.00".parse::<Price>(), Ok(Price::from_minor(-100)));
        assert_eq!("3.455".parse::<Price>(), Ok(Price::from_minor(346)));
        assert_eq!("3.454".parse::<Price>(), Ok(Price::from_minor(345)));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!("".parse::<Price>(), Err(ParsePriceError::Empty));
        assert!(matches!("£5".parse::<Price>(), Err(ParsePriceError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Price>(), Err(ParsePriceError::Invalid(_))));
        assert!(matches!("-".parse::<Price>(), Err(ParsePriceError::Invalid(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Price>(),
            Err(ParsePriceError::Overflow(_))
        ));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Price::from_minor(2500).to_string(), "25.00");
        assert_eq!(Price::from_minor(-5).to_string(), "-0.05");
        assert_eq!(Price::from_minor(1234).formatted(), "£12.34");
    }

    #[test]
    fn discount_rounds_half_up() {
        assert_eq!(Price::from_minor(2500).discounted(10), Price::from_minor(2250));
        assert_eq!(Price::from_minor(2499).discounted(10), Price::from_minor(2249));
        assert_eq!(Price::from_minor(5).discounted(10), Price::from_minor(5));
        assert_eq!(Price::ZERO.discounted(10), Price::ZERO);
    }
}

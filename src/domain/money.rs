use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Money is represented as an integer number of minor units (cents) to avoid
/// floating-point precision issues. €50.00 is stored as 5000.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Format with a currency code in front, e.g. "EUR 12.34".
    pub fn format_with_currency(self, currency: &str) -> String {
        format!("{} {}", currency, self)
    }
}

impl fmt::Display for Amount {
    /// Example: 5000 -> "50.00", -1234 -> "-12.34"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs_cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let negative = input.starts_with('-');
        let input = input.trim_start_matches('-');

        let (units_str, decimal_str) = match input.split_once('.') {
            Some((units, decimals)) => (units, decimals),
            None => (input, ""),
        };
        if decimal_str.contains('.') || (units_str.is_empty() && decimal_str.is_empty()) {
            return Err(ParseAmountError::InvalidFormat);
        }

        let units: i64 = if units_str.is_empty() {
            0
        } else {
            parse_digits(units_str)?
        };

        // Pad or truncate the decimal part to exactly 2 digits
        let decimal_cents: i64 = match decimal_str.len() {
            0 => 0,
            1 => parse_digits(decimal_str)? * 10,
            _ => parse_digits(&decimal_str[..2])?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(decimal_cents))
            .ok_or(ParseAmountError::Overflow)?;
        Ok(Amount(if negative { -cents } else { cents }))
    }
}

fn parse_digits(s: &str) -> Result<i64, ParseAmountError> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseAmountError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    #[error("invalid money format")]
    InvalidFormat,
    #[error("amount out of range")]
    Overflow,
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Amount, ParseAmountError> {
        s.parse()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(Amount::from_cents(5000).to_string(), "50.00");
        assert_eq!(Amount::from_cents(1234).to_string(), "12.34");
        assert_eq!(Amount::from_cents(1).to_string(), "0.01");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::from_cents(-5000).to_string(), "-50.00");
        assert_eq!(Amount::from_cents(-1).to_string(), "-0.01");
        assert_eq!(
            Amount::from_cents(100000).format_with_currency("EUR"),
            "EUR 1000.00"
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse("50.00"), Ok(Amount::from_cents(5000)));
        assert_eq!(parse("50"), Ok(Amount::from_cents(5000)));
        assert_eq!(parse("12.5"), Ok(Amount::from_cents(1250)));
        assert_eq!(parse(".50"), Ok(Amount::from_cents(50)));
        assert_eq!(parse("-50.00"), Ok(Amount::from_cents(-5000)));
        assert_eq!(parse("100.999"), Ok(Amount::from_cents(10099))); // Truncates
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse("abc").is_err());
        assert!(parse("12.34.56").is_err());
        assert!(parse("").is_err());
        assert!(parse("1e5").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_cents(1000);
        let b = Amount::from_cents(250);
        assert_eq!(a - b, Amount::from_cents(750));
        assert_eq!(-(a + b), Amount::from_cents(-1250));
        let total: Amount = [a, b, b].iter().sum();
        assert_eq!(total, Amount::from_cents(1500));
    }
}

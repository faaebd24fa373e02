use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use crate::EngineError;

/// Signed money amount represented as **integer centavos**.
///
/// Every monetary value in the engine (due amounts, payments, income,
/// expenses, funds) goes through this type so comparisons such as
/// `paid_so_far + amount > due.amount` are exact.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "Q12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted from input: Q1,000,000,000,000.00.
    ///
    /// Sums of accepted amounts stay far below `i64::MAX`.
    pub const MAX: Money = Money(100_000_000_000_000);

    /// Creates a new amount from integer centavos.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in centavos.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Plain decimal rendering without the currency sign (`"-12.30"`).
    ///
    /// This is the wire format used by the HTTP boundary.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}Q{units}.{cents:02}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into centavos.
    ///
    /// Accepts `.` or `,` as decimal separator, an optional leading `+`/`-`
    /// and an optional `Q` prefix.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - magnitude at most [`Money::MAX`]
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("amount is empty".to_string());
        let invalid = || EngineError::InvalidAmount(format!("'{}' is not a valid amount", s.trim()));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        let rest = rest.strip_prefix('Q').unwrap_or(rest).trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(EngineError::InvalidAmount(
                            "amount has more than 2 decimals".to_string(),
                        ));
                    }
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .filter(|v| *v <= Money::MAX.0)
            .ok_or_else(overflow)?;

        Ok(Money(sign * total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_quetzales() {
        assert_eq!(Money::new(0).to_string(), "Q0.00");
        assert_eq!(Money::new(1).to_string(), "Q0.01");
        assert_eq!(Money::new(1050).to_string(), "Q10.50");
        assert_eq!(Money::new(-1050).to_string(), "-Q10.50");
        assert_eq!(Money::new(-1050).to_decimal_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_comma_and_prefix() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("Q50.00".parse::<Money>().unwrap().cents(), 5000);
        assert_eq!("-0.01".parse::<Money>().unwrap().cents(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
    }

    #[test]
    fn parse_caps_magnitude() {
        assert_eq!("1000000000000".parse::<Money>().unwrap(), Money::MAX);
        assert_eq!("-1000000000000".parse::<Money>().unwrap().cents(), -Money::MAX.cents());
        assert_eq!(
            "1000000000000.01".parse::<Money>(),
            Err(EngineError::InvalidAmount("amount too large".to_string()))
        );
        assert!("92233720368547758.00".parse::<Money>().is_err());
    }

    #[test]
    fn sum_is_exact() {
        let parts = [Money::new(10), Money::new(20)];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::new(30));
        // 0.1 + 0.2 == 0.3 holds exactly in centavos.
        assert_eq!("0.1".parse::<Money>().unwrap() + "0.2".parse::<Money>().unwrap(), "0.3".parse::<Money>().unwrap());
    }
}

//! Amount type for parsing and displaying monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It accepts user input that may
//! contain thousands separators and prints values with separators and without trailing fractional
//! zeros.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// How many fractional digits are shown before trailing zeros are trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Precision {
    /// Two fractional digits, used for balances and totals: e.g. `1,234.5`.
    #[default]
    Money,
    /// Eight fractional digits, used for exchange rates: e.g. `0.00002312`.
    Rate,
}

/// Represents a monetary value.
///
/// Unlike the numeric value, the display form is lossy: it is rounded to the `Precision` and has
/// its trailing fractional zeros removed.
///
/// # Examples
///
/// ```
/// # use wealthflow::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,000.50").unwrap();
/// assert_eq!(amount.to_string(), "1,000.5");
/// assert_eq!(amount.labeled("$"), "$1,000.5");
/// ```
///
/// ```
/// # use wealthflow::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-2500").unwrap();
/// assert_eq!(amount.to_string(), "-2,500");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount {
    value: Decimal,
    #[serde(skip)]
    precision: Precision,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with `Precision::Money`.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            precision: Precision::Money,
        }
    }

    /// Creates a new Amount with the given display precision.
    pub const fn new_with_precision(value: Decimal, precision: Precision) -> Self {
        Self { value, precision }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Formats the amount with a unit symbol placed after the sign, e.g. `-€12.5`.
    pub fn labeled(&self, symbol: &str) -> String {
        let (sign, digits) = self.parts();
        format!("{sign}{symbol}{digits}")
    }

    /// Splits the display form into its sign and its separated digits.
    fn parts(&self) -> (&'static str, String) {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value().abs().to_f64().unwrap_or_default();
        let formatted = match self.precision {
            Precision::Money => format_num::format_num!(",.2", num),
            Precision::Rate => format_num::format_num!(",.8", num),
        };
        (sign, trim_fraction(formatted))
    }
}

/// Removes trailing fractional zeros, and the decimal point if nothing remains after it.
fn trim_fraction(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Thousands separators are accepted anywhere in the integer part
        let without_commas = trimmed.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, digits) = self.parts();
        write!(f, "{sign}{digits}")
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Sums `values`, or `None` when the total leaves the `Decimal` range.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Sums `values`, capping at `Decimal::MIN` and `Decimal::MAX`.
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec!(50));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec!(1234567.89));
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-30").unwrap();
        assert_eq!(amount.value(), dec!(-30));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("   ").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(Amount::new(dec!(70.00)).to_string(), "70");
        assert_eq!(Amount::new(dec!(1500.10)).to_string(), "1,500.1");
        assert_eq!(Amount::new(dec!(0.126)).to_string(), "0.13");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Amount::new(dec!(-1234.5)).to_string(), "-1,234.5");
        assert_eq!(Amount::new(dec!(-1234.5)).labeled("£"), "-£1,234.5");
    }

    #[test]
    fn test_display_rate_precision() {
        let rate = Amount::new_with_precision(dec!(0.00002312), Precision::Rate);
        assert_eq!(rate.to_string(), "0.00002312");
        let rate = Amount::new_with_precision(dec!(43250), Precision::Rate);
        assert_eq!(rate.to_string(), "43,250");
    }

    #[test]
    fn test_sums_at_the_edge_of_the_range() {
        assert_eq!(checked_sum([dec!(1), dec!(2.5)]), Some(dec!(3.5)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(
            checked_sum([Decimal::MAX, Decimal::ONE, Decimal::NEGATIVE_ONE]),
            None
        );
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(saturating_sum([Decimal::MIN, dec!(-5)]), Decimal::MIN);
    }

    #[test]
    fn test_zero_is_not_negative() {
        let zero = Amount::new(Decimal::ZERO);
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert_eq!(zero.to_string(), "0");
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Amount::new(dec!(12.5))).unwrap();
        assert_eq!(json, "12.5");
    }
}

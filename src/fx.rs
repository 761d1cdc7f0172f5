//! Conversion of amounts between units using the user's exchange-rate table.
//!
//! A conversion tries, in order: identity, the direct rate, the inverse of the reverse rate, and
//! finally a bridge through the pivot unit when both units have a rate *to* the pivot. There is no
//! multi-hop search beyond that single pivot.

use crate::model::ExchangeRates;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The pivot unit used when no configuration says otherwise.
pub const DEFAULT_PIVOT: &str = "USD";

/// How a conversion was resolved.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPath {
    /// Same unit, or a zero amount.
    Identity,
    /// A `from -> to` rate was multiplied.
    Direct,
    /// A `to -> from` rate was divided.
    Inverse,
    /// `from -> pivot` and `to -> pivot` rates were combined.
    Pivot,
    /// No path exists; the amount was returned unconverted.
    Unresolved,
}

serde_plain::derive_display_from_serialize!(ConversionPath);

/// The result of a conversion along with the path that produced it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Conversion {
    pub value: Decimal,
    pub path: ConversionPath,
}

impl Conversion {
    /// False when the value is the unconverted input because no rate path exists.
    pub fn is_resolved(&self) -> bool {
        self.path != ConversionPath::Unresolved
    }
}

/// Converts amounts using a borrowed rate table.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    rates: &'a ExchangeRates,
    pivot: &'a str,
}

impl<'a> Converter<'a> {
    /// Creates a converter that bridges through `USD`.
    pub fn new(rates: &'a ExchangeRates) -> Self {
        Self::with_pivot(rates, DEFAULT_PIVOT)
    }

    pub fn with_pivot(rates: &'a ExchangeRates, pivot: &'a str) -> Self {
        Self { rates, pivot }
    }

    pub fn pivot(&self) -> &str {
        self.pivot
    }

    /// Converts `amount` from `from` to `to`. When no path exists the amount is returned
    /// unchanged and a warning is logged; use `convert_detailed` to detect that case.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        self.convert_detailed(amount, from, to).value
    }

    /// Converts `amount` from `from` to `to` and reports which path was used. A path whose
    /// arithmetic overflows is skipped like a missing rate.
    pub fn convert_detailed(&self, amount: Decimal, from: &str, to: &str) -> Conversion {
        if amount.is_zero() || from == to {
            return Conversion {
                value: amount,
                path: ConversionPath::Identity,
            };
        }

        if let Some(direct) = self.rates.find(from, to) {
            if let Some(value) = amount.checked_mul(direct.value()) {
                return Conversion {
                    value,
                    path: ConversionPath::Direct,
                };
            }
        }

        // Rates are validated positive on entry; a zero from a hand-edited file is skipped
        if let Some(inverse) = self.rates.find(to, from) {
            if let Some(value) = amount.checked_div(inverse.value()) {
                return Conversion {
                    value,
                    path: ConversionPath::Inverse,
                };
            }
        }

        let from_pivot = self.rates.find(from, self.pivot);
        let to_pivot = self.rates.find(to, self.pivot);
        if let (Some(from_pivot), Some(to_pivot)) = (from_pivot, to_pivot) {
            let value = amount
                .checked_mul(from_pivot.value())
                .and_then(|bridged| bridged.checked_div(to_pivot.value()));
            if let Some(value) = value {
                return Conversion {
                    value,
                    path: ConversionPath::Pivot,
                };
            }
        }

        warn!("No usable exchange rate for {from} -> {to}, leaving {amount} {from} unconverted");
        Conversion {
            value: amount,
            path: ConversionPath::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;
    use rust_decimal_macros::dec;

    /// Units USD, EUR, GBP, BTC with the seed rates EUR->USD 1.09, BTC->USD 43250, GBP->USD 1.27.
    fn seed() -> ExchangeRates {
        ExchangeRates::default()
    }

    #[test]
    fn test_identity_same_unit() {
        let rates = seed();
        let fx = Converter::new(&rates);
        for code in ["USD", "EUR", "GBP", "BTC", "NOPE"] {
            let c = fx.convert_detailed(dec!(123.45), code, code);
            assert_eq!(c.value, dec!(123.45));
            assert_eq!(c.path, ConversionPath::Identity);
        }
    }

    #[test]
    fn test_identity_zero_amount() {
        let rates = ExchangeRates::empty();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(Decimal::ZERO, "EUR", "IRT");
        assert!(c.value.is_zero());
        assert!(c.is_resolved());
    }

    #[test]
    fn test_direct() {
        let rates = seed();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(dec!(100), "EUR", "USD");
        assert_eq!(c.value, dec!(109));
        assert_eq!(c.path, ConversionPath::Direct);
    }

    #[test]
    fn test_inverse() {
        let rates = seed();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(dec!(86500), "USD", "BTC");
        assert_eq!(c.value, dec!(2));
        assert_eq!(c.path, ConversionPath::Inverse);
    }

    #[test]
    fn test_pivot() {
        let rates = seed();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(dec!(127), "GBP", "EUR");
        assert_eq!(c.path, ConversionPath::Pivot);
        assert_eq!(c.value, dec!(127) * dec!(1.27) / dec!(1.09));
    }

    #[test]
    fn test_direct_preferred_over_pivot() {
        let units = Units::default();
        let mut rates = seed();
        rates.add(&units, "GBP", "EUR", dec!(1.2)).unwrap();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(dec!(10), "GBP", "EUR");
        assert_eq!(c.path, ConversionPath::Direct);
        assert_eq!(c.value, dec!(12));
        let c = fx.convert_detailed(dec!(12), "EUR", "GBP");
        assert_eq!(c.path, ConversionPath::Inverse);
        assert_eq!(c.value, dec!(10));
    }

    #[test]
    fn test_pivot_requires_rates_towards_pivot() {
        // USD -> EUR points away from the pivot, so GBP -> EUR cannot bridge through it
        let units = Units::default();
        let mut rates = ExchangeRates::empty();
        rates.add(&units, "USD", "EUR", dec!(0.92)).unwrap();
        rates.add(&units, "GBP", "USD", dec!(1.27)).unwrap();
        let fx = Converter::new(&rates);
        let c = fx.convert_detailed(dec!(10), "GBP", "EUR");
        assert_eq!(c.path, ConversionPath::Unresolved);
        assert_eq!(c.value, dec!(10));
    }

    #[test]
    fn test_unresolved_returns_input() {
        let rates = seed();
        let fx = Converter::new(&rates);
        assert_eq!(fx.convert(dec!(42000), "IRT", "USD"), dec!(42000));
        assert!(!fx.convert_detailed(dec!(1), "IRT", "EUR").is_resolved());
    }

    #[test]
    fn test_custom_pivot() {
        let units = Units::default();
        let mut rates = ExchangeRates::empty();
        rates.add(&units, "USD", "EUR", dec!(0.9)).unwrap();
        rates.add(&units, "GBP", "EUR", dec!(1.2)).unwrap();
        let fx = Converter::with_pivot(&rates, "EUR");
        assert_eq!(fx.pivot(), "EUR");
        let c = fx.convert_detailed(dec!(9), "USD", "GBP");
        assert_eq!(c.path, ConversionPath::Pivot);
        assert_eq!(c.value, dec!(9) * dec!(0.9) / dec!(1.2));
    }

    #[test]
    fn test_overflow_is_unresolved() {
        let rates = seed();
        let fx = Converter::new(&rates);
        let huge = Decimal::MAX / dec!(10);
        let c = fx.convert_detailed(huge, "BTC", "USD");
        assert_eq!(c.path, ConversionPath::Unresolved);
        assert_eq!(c.value, huge);
        // BTC -> USD overflows, so the pivot bridge does too
        let c = fx.convert_detailed(huge, "BTC", "EUR");
        assert_eq!(c.path, ConversionPath::Unresolved);
        let large = Decimal::from_i128_with_scale(10i128.pow(20), 0);
        let c = fx.convert_detailed(large, "BTC", "USD");
        assert_eq!(c.path, ConversionPath::Direct);
        assert_eq!(c.value, large * dec!(43250));
    }

    #[test]
    fn test_path_display() {
        assert_eq!(ConversionPath::Unresolved.to_string(), "unresolved");
    }
}

use crate::model::{normalize_code, Units};
use crate::Result;
use anyhow::{bail, ensure, Context};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A directed exchange rate: one `from` is worth `value` of `to`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    id: u64,
    from: String,
    to: String,
    value: Decimal,
    updated: NaiveDate,
}

impl ExchangeRate {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn updated(&self) -> NaiveDate {
        self.updated
    }

    /// True when the rate connects `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// True when `code` is either endpoint.
    pub fn references(&self, code: &str) -> bool {
        self.from == code || self.to == code
    }
}

/// The table of exchange rates. At most one rate exists per unordered pair of units.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    data: Vec<ExchangeRate>,
}

impl Default for ExchangeRates {
    /// Seed rates against USD for the default units.
    fn default() -> Self {
        let updated = NaiveDate::from_ymd_opt(2025, 11, 25).unwrap_or_default();
        let seed = [
            ("EUR", "USD", dec!(1.09)),
            ("BTC", "USD", dec!(43250)),
            ("GBP", "USD", dec!(1.27)),
        ];
        Self {
            data: seed
                .into_iter()
                .zip(1u64..)
                .map(|((from, to, value), id)| ExchangeRate {
                    id,
                    from: from.to_string(),
                    to: to.to_string(),
                    value,
                    updated,
                })
                .collect(),
        }
    }
}

impl ExchangeRates {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    pub fn data(&self) -> &[ExchangeRate] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ExchangeRate> {
        self.data.iter().find(|r| r.id == id)
    }

    /// The rate stored in exactly the `from` -> `to` direction.
    pub fn find(&self, from: &str, to: &str) -> Option<&ExchangeRate> {
        self.data.iter().find(|r| r.from == from && r.to == to)
    }

    /// Adds a rate after validating it against `units` and the existing table.
    ///
    /// # Errors
    /// - Fewer than two units exist.
    /// - `from` and `to` are the same unit, or either is unknown.
    /// - `value` is not positive.
    /// - A rate between the two units already exists, in either direction.
    pub fn add(
        &mut self,
        units: &Units,
        from: &str,
        to: &str,
        value: Decimal,
    ) -> Result<&ExchangeRate> {
        ensure!(
            units.len() >= 2,
            "At least two units are needed to create an exchange rate"
        );
        let from = normalize_code(from);
        let to = normalize_code(to);
        ensure!(!from.is_empty(), "A 'from' unit is required");
        ensure!(!to.is_empty(), "A 'to' unit is required");
        ensure!(from != to, "The 'from' and 'to' units cannot be the same");
        ensure!(units.contains(&from), "Unknown unit '{from}'");
        ensure!(units.contains(&to), "Unknown unit '{to}'");
        ensure_positive(value)?;
        if let Some(existing) = self.data.iter().find(|r| r.connects(&from, &to)) {
            bail!(
                "A rate between {from} and {to} already exists ({} -> {}, id {})",
                existing.from,
                existing.to,
                existing.id
            );
        }

        let id = self.data.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        self.data.push(ExchangeRate {
            id,
            from,
            to,
            value,
            updated: today(),
        });
        self.data
            .last()
            .context("The rate table is unexpectedly empty")
    }

    /// Replaces the value of the rate with `id`.
    pub fn update(&mut self, id: u64, value: Decimal) -> Result<&ExchangeRate> {
        ensure_positive(value)?;
        let rate = self
            .data
            .iter_mut()
            .find(|r| r.id == id)
            .with_context(|| format!("No exchange rate with id {id}"))?;
        rate.value = value;
        rate.updated = today();
        Ok(rate)
    }

    /// Removes the rate with `id` and returns it.
    pub fn delete(&mut self, id: u64) -> Result<ExchangeRate> {
        let ix = self
            .data
            .iter()
            .position(|r| r.id == id)
            .with_context(|| format!("No exchange rate with id {id}"))?;
        Ok(self.data.remove(ix))
    }

    /// Removes every rate where `code` is either endpoint and returns the removed rates.
    pub fn delete_for_unit(&mut self, code: &str) -> Vec<ExchangeRate> {
        let code = normalize_code(code);
        let (removed, kept): (Vec<ExchangeRate>, Vec<ExchangeRate>) = std::mem::take(&mut self.data)
            .into_iter()
            .partition(|r| r.references(&code));
        self.data = kept;
        removed
    }
}

fn ensure_positive(value: Decimal) -> Result<()> {
    ensure!(
        value > Decimal::ZERO,
        "An exchange rate must be greater than zero, got {value}"
    );
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

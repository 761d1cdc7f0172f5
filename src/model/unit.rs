use crate::Result;
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};

/// A currency or asset denomination, e.g. `USD`, `BTC` or `GOLD`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    code: String,
    name: String,
    symbol: String,
}

impl Unit {
    /// Creates a unit. The code is trimmed and upper-cased; every field must be non-empty.
    pub fn new(
        code: impl AsRef<str>,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self> {
        let code = normalize_code(code);
        let name = name.into().trim().to_string();
        let symbol = symbol.into().trim().to_string();
        ensure!(!code.is_empty(), "A unit code is required");
        ensure!(!name.is_empty(), "A unit name is required");
        ensure!(!symbol.is_empty(), "A unit symbol is required");
        Ok(Self { code, name, symbol })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Unit codes are compared after trimming and upper-casing.
pub fn normalize_code(code: impl AsRef<str>) -> String {
    code.as_ref().trim().to_uppercase()
}

/// The registry of units, keyed by code. Order is preserved: the first unit is used as the base
/// unit when no other choice is available.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Units {
    data: Vec<Unit>,
}

impl Default for Units {
    /// The registry a fresh data directory starts with.
    fn default() -> Self {
        let seed = [
            ("USD", "US Dollar", "$"),
            ("EUR", "Euro", "€"),
            ("GBP", "British Pound", "£"),
            ("BTC", "Bitcoin", "₿"),
        ];
        Self {
            data: seed
                .into_iter()
                .map(|(code, name, symbol)| Unit {
                    code: code.to_string(),
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                })
                .collect(),
        }
    }
}

impl Units {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    pub fn data(&self) -> &[Unit] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn first(&self) -> Option<&Unit> {
        self.data.first()
    }

    pub fn get(&self, code: &str) -> Option<&Unit> {
        let code = normalize_code(code);
        self.data.iter().find(|u| u.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// The display symbol for `code`, or the code itself when the unit is unknown.
    pub fn symbol_or_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(Unit::symbol).unwrap_or(code)
    }

    /// Adds `unit`, rejecting a duplicate code.
    pub fn add(&mut self, unit: Unit) -> Result<&Unit> {
        if self.contains(&unit.code) {
            bail!("A unit with the code '{}' already exists", unit.code);
        }
        self.data.push(unit);
        self.data
            .last()
            .context("The unit registry is unexpectedly empty")
    }

    /// Replaces the display fields of the unit identified by `code`. The code never changes.
    pub fn update(
        &mut self,
        code: &str,
        name: Option<String>,
        symbol: Option<String>,
    ) -> Result<&Unit> {
        let code = normalize_code(code);
        let name = name.map(|n| n.trim().to_string());
        let symbol = symbol.map(|s| s.trim().to_string());
        ensure!(
            name.as_deref() != Some(""),
            "A unit name cannot be empty"
        );
        ensure!(
            symbol.as_deref() != Some(""),
            "A unit symbol cannot be empty"
        );
        let unit = self
            .data
            .iter_mut()
            .find(|u| u.code == code)
            .with_context(|| format!("No unit with the code '{code}'"))?;
        if let Some(name) = name {
            unit.name = name;
        }
        if let Some(symbol) = symbol {
            unit.symbol = symbol;
        }
        Ok(unit)
    }

    /// Removes the unit identified by `code` and returns it. Rates are not touched here; see
    /// `WealthData::delete_unit` for the cascading removal.
    pub(crate) fn remove(&mut self, code: &str) -> Result<Unit> {
        let code = normalize_code(code);
        let ix = self
            .data
            .iter()
            .position(|u| u.code == code)
            .with_context(|| format!("No unit with the code '{code}'"))?;
        Ok(self.data.remove(ix))
    }
}

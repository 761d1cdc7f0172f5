//! Commands for the unit registry.

use crate::commands::table::Table;
use crate::commands::{load, mutate, Out};
use crate::model::{ExchangeRate, Unit};
use crate::{Config, Result};
use anyhow::ensure;
use serde::Serialize;

/// A deleted unit along with the exchange rates that were deleted with it.
#[derive(Debug, Clone, Serialize)]
pub struct UnitDeleted {
    pub unit: Unit,
    pub rates: Vec<ExchangeRate>,
}

/// Lists all units, marking the base unit.
pub async fn unit_list(config: Config) -> Result<Out<Vec<Unit>>> {
    let data = load(&config).await?;
    let base = data.base_unit();
    let mut table = Table::new(&["Code", "Name", "Symbol", "Base"]);
    for unit in data.units().data() {
        table.push(vec![
            unit.code().to_string(),
            unit.name().to_string(),
            unit.symbol().to_string(),
            if unit.code() == base { "*" } else { "" }.to_string(),
        ]);
    }
    let units = data.units().data().to_vec();
    Ok(Out::new(format!("{} unit(s)", units.len()), units).with_output(table.markdown()))
}

pub async fn unit_add(config: Config, code: &str, name: &str, symbol: &str) -> Result<Out<Unit>> {
    let unit = Unit::new(code, name, symbol)?;
    let unit = mutate(&config, |data| Ok(data.add_unit(unit)?.clone())).await?;
    Ok(Out::new(
        format!("Added unit {} ({})", unit.code(), unit.name()),
        unit,
    ))
}

/// Changes the display name and/or symbol of a unit.
pub async fn unit_update(
    config: Config,
    code: &str,
    name: Option<&str>,
    symbol: Option<&str>,
) -> Result<Out<Unit>> {
    ensure!(
        name.is_some() || symbol.is_some(),
        "Nothing to update, pass a new name and/or symbol"
    );
    let unit = mutate(&config, |data| {
        Ok(data
            .update_unit(code, name.map(str::to_string), symbol.map(str::to_string))?
            .clone())
    })
    .await?;
    Ok(Out::new(format!("Updated unit {}", unit.code()), unit))
}

/// Deletes a unit and every rate that references it.
pub async fn unit_delete(config: Config, code: &str) -> Result<Out<UnitDeleted>> {
    let (unit, rates) = mutate(&config, |data| data.delete_unit(code)).await?;
    let message = format!(
        "Deleted unit {} and {} exchange rate(s) that referenced it",
        unit.code(),
        rates.len()
    );
    Ok(Out::new(message, UnitDeleted { unit, rates }))
}

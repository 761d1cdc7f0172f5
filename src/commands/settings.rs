//! Commands for settings stored in the data document.

use crate::commands::{load, mutate, Out};
use crate::model::Unit;
use crate::{Config, Result};
use anyhow::Context;

/// Shows the base unit, or sets it when `code` is given.
pub async fn base_unit(config: Config, code: Option<&str>) -> Result<Out<Unit>> {
    match code {
        None => {
            let data = load(&config).await?;
            let unit = data
                .units()
                .get(data.base_unit())
                .cloned()
                .context("There are no units, add one with 'wealth unit add'")?;
            Ok(Out::new(
                format!("The base unit is {} ({})", unit.code(), unit.name()),
                unit,
            ))
        }
        Some(code) => {
            let unit = mutate(&config, |data| Ok(data.set_base_unit(code)?.clone())).await?;
            Ok(Out::new(
                format!("The base unit is now {} ({})", unit.code(), unit.name()),
                unit,
            ))
        }
    }
}

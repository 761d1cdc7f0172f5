//! Commands for the exchange-rate table.

use crate::commands::table::Table;
use crate::commands::{load, mutate, Out};
use crate::model::{Amount, ExchangeRate, Precision};
use crate::{Config, Result};
use rust_decimal::Decimal;

pub async fn rate_list(config: Config) -> Result<Out<Vec<ExchangeRate>>> {
    let data = load(&config).await?;
    let mut table = Table::new(&["Id", "From", "To", "Value", "Updated"]);
    for rate in data.exchange_rates().data() {
        table.push(vec![
            rate.id().to_string(),
            rate.from().to_string(),
            rate.to().to_string(),
            rate_display(rate.value()),
            rate.updated().to_string(),
        ]);
    }
    let rates = data.exchange_rates().data().to_vec();
    Ok(Out::new(format!("{} exchange rate(s)", rates.len()), rates).with_output(table.markdown()))
}

/// Adds a rate meaning one `from` is worth `value` of `to`.
pub async fn rate_add(
    config: Config,
    from: &str,
    to: &str,
    value: Decimal,
) -> Result<Out<ExchangeRate>> {
    let rate = mutate(&config, |data| Ok(data.add_rate(from, to, value)?.clone())).await?;
    Ok(Out::new(
        format!(
            "Added rate {}: 1 {} = {} {}",
            rate.id(),
            rate.from(),
            rate_display(rate.value()),
            rate.to()
        ),
        rate,
    ))
}

pub async fn rate_update(config: Config, id: u64, value: Decimal) -> Result<Out<ExchangeRate>> {
    let rate = mutate(&config, |data| Ok(data.update_rate(id, value)?.clone())).await?;
    Ok(Out::new(
        format!(
            "Updated rate {}: 1 {} = {} {}",
            rate.id(),
            rate.from(),
            rate_display(rate.value()),
            rate.to()
        ),
        rate,
    ))
}

pub async fn rate_delete(config: Config, id: u64) -> Result<Out<ExchangeRate>> {
    let rate = mutate(&config, |data| data.delete_rate(id)).await?;
    Ok(Out::new(
        format!("Deleted rate {} ({} -> {})", rate.id(), rate.from(), rate.to()),
        rate,
    ))
}

fn rate_display(value: Decimal) -> String {
    Amount::new_with_precision(value, Precision::Rate).to_string()
}

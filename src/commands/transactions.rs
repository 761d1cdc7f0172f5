//! Commands for transactions within an account.

use crate::commands::table::money;
use crate::commands::{mutate, Out};
use crate::model::{NewTransaction, PurchasePrice, Transaction};
use crate::{Config, Result};

/// Records a transaction and returns it along with the account's new balance in the message.
pub async fn tx_add(
    config: Config,
    account_id: u64,
    new: NewTransaction,
) -> Result<Out<Transaction>> {
    let (tx, balance, symbol) = mutate(&config, |data| {
        let tx = data.add_transaction(account_id, new)?.clone();
        let account = data
            .account(account_id)
            .map(|a| (a.balance(), a.currency().to_string()));
        let (balance, currency) = account.unwrap_or_default();
        let symbol = data.units().symbol_or_code(&currency).to_string();
        Ok((tx, balance, symbol))
    })
    .await?;
    Ok(Out::new(
        format!(
            "Added {} {} of {}, the balance is now {}",
            tx.r#type(),
            tx.id(),
            money(tx.amount(), &symbol),
            money(balance, &symbol)
        ),
        tx,
    ))
}

pub async fn tx_delete(config: Config, account_id: u64, id: u64) -> Result<Out<Transaction>> {
    let tx = mutate(&config, |data| data.delete_transaction(account_id, id)).await?;
    Ok(Out::new(
        format!("Deleted {} {} of {}", tx.r#type(), tx.id(), tx.amount()),
        tx,
    ))
}

/// Builds the purchase price from the optional pair of CLI values. Both or neither must be given.
pub fn purchase(price: Option<rust_decimal::Decimal>, unit: Option<&str>) -> Option<PurchasePrice> {
    match (price, unit) {
        (Some(price), Some(unit)) => Some(PurchasePrice {
            price,
            unit: unit.to_string(),
        }),
        _ => None,
    }
}

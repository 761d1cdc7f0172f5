//! Commands for accounts.

use crate::commands::table::{money, Table};
use crate::commands::{converter, load, mutate, warn_unresolved, Out};
use crate::model::{Account, Transaction, TransactionType};
use crate::portfolio::{self, AccountSummary, UnitPair};
use crate::{Config, Result};
use anyhow::{ensure, Context};
use serde::Serialize;

/// Changes to apply to an account. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl AccountChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.currency.is_none()
            && self.icon.is_none()
            && self.color.is_none()
    }
}

/// An account's values together with its transactions.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    pub summary: AccountSummary,
    pub transactions: Vec<Transaction>,
    pub unresolved: Vec<UnitPair>,
}

/// Lists every account with its balance in its own currency and in the base unit.
pub async fn account_list(config: Config) -> Result<Out<Vec<AccountSummary>>> {
    let data = load(&config).await?;
    let summary = portfolio::summarize(&data, converter(&config, &data));
    warn_unresolved(&summary.unresolved);

    let base = summary.base_unit.as_str();
    let base_symbol = data.units().symbol_or_code(base);
    let balance_base = format!("Balance ({base})");
    let mut table = Table::new(&[
        "Id",
        "",
        "Name",
        "Currency",
        "Balance",
        balance_base.as_str(),
        "P/L",
    ]);
    for account in &summary.accounts {
        let symbol = data.units().symbol_or_code(&account.currency);
        table.push(vec![
            account.id.to_string(),
            account.icon.clone(),
            account.name.clone(),
            account.currency.clone(),
            money(account.balance, symbol),
            money(account.balance_base, base_symbol),
            money(account.profit_loss, symbol),
        ]);
    }

    let message = if summary.accounts.is_empty() {
        "No accounts yet, add one with 'wealth account add'".to_string()
    } else {
        format!("{} account(s)", summary.accounts.len())
    };
    let out = Out::new(message, summary.accounts);
    Ok(if table.is_empty() {
        out
    } else {
        out.with_output(table.markdown())
    })
}

/// Shows one account, its values in the base unit and its transactions, newest first.
pub async fn account_show(config: Config, id: u64) -> Result<Out<AccountDetail>> {
    let data = load(&config).await?;
    let account = data
        .account(id)
        .with_context(|| format!("No account with id {id}"))?;
    let (summary, unresolved) =
        portfolio::summarize_account(&data, account, converter(&config, &data));
    warn_unresolved(&unresolved);

    let base = data.base_unit();
    let symbol = data.units().symbol_or_code(account.currency());
    let base_symbol = data.units().symbol_or_code(base);
    let mut transactions = account.transactions().to_vec();
    transactions.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    let mut table = Table::new(&["Id", "Date", "Type", "Amount", "Description", "Purchase"]);
    for tx in &transactions {
        let purchase = match (tx.purchase_price(), tx.purchase_unit()) {
            (Some(price), Some(unit)) if tx.track_price() => {
                money(price, data.units().symbol_or_code(unit))
            }
            _ => String::new(),
        };
        table.push(vec![
            tx.id().to_string(),
            tx.timestamp().format("%Y-%m-%d %H:%M").to_string(),
            tx.r#type().to_string(),
            money(tx.signed_amount(), symbol),
            tx.description().unwrap_or_default().to_string(),
            purchase,
        ]);
    }

    let mut lines = vec![
        format!("{} {} ({})", account.icon(), account.name(), account.currency()),
        format!(
            "Balance: {} ({})",
            money(summary.balance, symbol),
            money(summary.balance_base, base_symbol)
        ),
        format!(
            "Deposits: {} ({})",
            money(summary.deposits, symbol),
            money(summary.deposits_base, base_symbol)
        ),
        format!(
            "Profit/Loss: {} ({})",
            money(summary.profit_loss, symbol),
            money(summary.profit_loss_base, base_symbol)
        ),
    ];
    if !table.is_empty() {
        lines.push(String::new());
        lines.push(table.markdown());
    }

    let withdrawals = transactions
        .iter()
        .filter(|t| t.r#type() == TransactionType::Withdrawal)
        .count();
    let message = format!(
        "Account {} has {} transaction(s), {} of them withdrawal(s)",
        account.name(),
        transactions.len(),
        withdrawals
    );
    let detail = AccountDetail {
        summary,
        transactions,
        unresolved,
    };
    Ok(Out::new(message, detail).with_output(lines.join("\n")))
}

pub async fn account_add(
    config: Config,
    name: &str,
    currency: &str,
    icon: Option<&str>,
    color: Option<&str>,
) -> Result<Out<Account>> {
    let account = mutate(&config, |data| {
        Ok(data
            .add_account(
                name,
                currency,
                icon.map(str::to_string),
                color.map(str::to_string),
            )?
            .clone())
    })
    .await?;
    Ok(Out::new(
        format!(
            "Added account {} '{}' in {}",
            account.id(),
            account.name(),
            account.currency()
        ),
        account,
    ))
}

/// Applies `changes` to the account with `id`. The balance is recomputed, and it is now read in
/// the new currency when the currency changes.
pub async fn account_update(
    config: Config,
    id: u64,
    changes: AccountChanges,
) -> Result<Out<Account>> {
    ensure!(
        !changes.is_empty(),
        "Nothing to update, pass a new name, currency, icon or color"
    );
    let account = mutate(&config, |data| {
        Ok(data
            .update_account(
                id,
                changes.name,
                changes.currency,
                changes.icon,
                changes.color,
            )?
            .clone())
    })
    .await?;
    Ok(Out::new(
        format!("Updated account {} '{}'", account.id(), account.name()),
        account,
    ))
}

/// Deletes an account along with its transactions.
pub async fn account_delete(config: Config, id: u64) -> Result<Out<Account>> {
    let account = mutate(&config, |data| data.delete_account(id)).await?;
    Ok(Out::new(
        format!(
            "Deleted account '{}' and its {} transaction(s)",
            account.name(),
            account.transactions().len()
        ),
        account,
    ))
}

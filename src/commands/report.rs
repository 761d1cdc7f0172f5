//! Read-only reports: single conversions, the portfolio summary and the activity feed.

use crate::commands::table::{money, Table};
use crate::commands::{converter, load, warn_unresolved, OutputFormat, Out};
use crate::fx::ConversionPath;
use crate::model::{normalize_code, Amount, Precision, Units};
use crate::portfolio::{self, Activity, Summary};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// The outcome of `wealth convert`.
#[derive(Debug, Clone, Serialize)]
pub struct Converted {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    pub value: Decimal,
    pub path: ConversionPath,
}

/// Converts `amount` from `from` to `to`. A missing rate path is not an error: the amount is
/// returned unconverted and the path is `unresolved`.
pub async fn convert(
    config: Config,
    amount: Decimal,
    from: &str,
    to: &str,
) -> Result<Out<Converted>> {
    let data = load(&config).await?;
    let from = normalize_code(from);
    let to = normalize_code(to);
    let fx = converter(&config, &data);
    let conversion = fx.convert_detailed(amount, &from, &to);

    let message = if conversion.is_resolved() {
        let path = match conversion.path {
            ConversionPath::Pivot => format!("pivot through {}", fx.pivot()),
            path => path.to_string(),
        };
        format!(
            "{} {from} = {} {to} ({path})",
            precise(amount),
            precise(conversion.value),
        )
    } else {
        format!(
            "No usable exchange rate path from {from} to {to}, the amount is left unconverted: \
            {} {from}",
            precise(amount)
        )
    };
    Ok(Out::new(
        message,
        Converted {
            amount,
            from,
            to,
            value: conversion.value,
            path: conversion.path,
        },
    ))
}

/// Totals, per-account values and the deposit distribution, all in the base unit.
pub async fn summary(config: Config, format: OutputFormat) -> Result<Out<Summary>> {
    let data = load(&config).await?;
    let summary = portfolio::summarize(&data, converter(&config, &data));
    warn_unresolved(&summary.unresolved);

    let units = data.units();
    let base = summary.base_unit.as_str();
    let base_symbol = units.symbol_or_code(base);
    let output = match format {
        OutputFormat::Json | OutputFormat::Csv => {
            summary_table(&summary, units, format == OutputFormat::Csv)
                .render(format, &summary)?
                .to_string()
        }
        OutputFormat::Table => {
            let mut lines = vec![
                format!("Total wealth: {}", money(summary.total_wealth, base_symbol)),
                format!(
                    "Total profit/loss: {}",
                    money(summary.total_profit_loss, base_symbol)
                ),
                format!(
                    "Total deposits: {}",
                    money(summary.total_deposits, base_symbol)
                ),
            ];
            if !summary.overflowed.is_empty() {
                lines.push(format!(
                    "Capped at the largest supported value: {}",
                    summary.overflowed.join(", ")
                ));
            }
            let table = summary_table(&summary, units, false);
            if !table.is_empty() {
                lines.push(String::new());
                lines.push(table.markdown());
            }
            lines.join("\n")
        }
    };

    let message = format!(
        "Total wealth is {} across {} account(s)",
        money(summary.total_wealth, base_symbol),
        summary.accounts.len()
    );
    Ok(Out::new(message, summary).with_output(output))
}

/// One row per account. With `raw` set the numbers are plain decimals, for CSV.
fn summary_table(summary: &Summary, units: &Units, raw: bool) -> Table {
    let base = summary.base_unit.as_str();
    let base_symbol = units.symbol_or_code(base);
    let headers = [
        "Id".to_string(),
        "Account".to_string(),
        "Currency".to_string(),
        "Balance".to_string(),
        format!("Balance ({base})"),
        format!("Deposits ({base})"),
        format!("P/L ({base})"),
        "Share %".to_string(),
    ];
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut table = Table::new(&headers);
    for account in &summary.accounts {
        let symbol = units.symbol_or_code(&account.currency);
        let share = summary
            .distribution
            .iter()
            .find(|d| d.account_id == account.id)
            .map(|d| d.percent.round_dp(2).normalize().to_string())
            .unwrap_or_default();
        let show = |value: Decimal, symbol: &str| {
            if raw {
                value.normalize().to_string()
            } else {
                money(value, symbol)
            }
        };
        table.push(vec![
            account.id.to_string(),
            account.name.clone(),
            account.currency.clone(),
            show(account.balance, symbol),
            show(account.balance_base, base_symbol),
            show(account.deposits_base, base_symbol),
            show(account.profit_loss_base, base_symbol),
            share,
        ]);
    }
    table
}

/// Recent transactions across all accounts, newest first.
pub async fn activity(
    config: Config,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<Out<Vec<Activity>>> {
    let data = load(&config).await?;
    let (items, unresolved) = portfolio::activity(&data, converter(&config, &data), limit);
    warn_unresolved(&unresolved);

    let units = data.units();
    let base = data.base_unit();
    let base_symbol = units.symbol_or_code(base);
    let amount_base = format!("Amount ({base})");
    let mut table = Table::new(&[
        "Date",
        "Account",
        "Type",
        "Amount",
        amount_base.as_str(),
        "Description",
    ]);
    let raw = format == OutputFormat::Csv;
    for item in &items {
        let symbol = units.symbol_or_code(&item.account_currency);
        let (amount, converted) = if raw {
            (
                item.signed_amount.normalize().to_string(),
                item.amount_base.normalize().to_string(),
            )
        } else {
            (
                money(item.signed_amount, symbol),
                money(item.amount_base, base_symbol),
            )
        };
        table.push(vec![
            if raw {
                item.timestamp.to_rfc3339()
            } else {
                item.timestamp.format("%Y-%m-%d %H:%M").to_string()
            },
            item.account_name.clone(),
            item.r#type.to_string(),
            amount,
            converted,
            item.description.clone().unwrap_or_default(),
        ]);
    }

    let message = if items.is_empty() {
        "No transactions yet".to_string()
    } else {
        format!("{} recent transaction(s)", items.len())
    };
    let output = table.render(format, &items)?.to_string();
    Ok(Out::new(message, items).with_output(output))
}

/// Rate precision, so that small crypto amounts stay visible.
fn precise(value: Decimal) -> Amount {
    Amount::new_with_precision(value, Precision::Rate)
}

//! Roll-ups of account and transaction values into portfolio totals, all expressed in the base
//! unit.
//!
//! Every function here is fail-soft: a missing exchange rate never produces an error. Instead the
//! unconverted value is used and the offending pair is listed in `unresolved`. A conversion that
//! would overflow is treated the same way, and totals that leave the `Decimal` range are capped
//! and listed in `overflowed`.

use crate::fx::Converter;
use crate::model::{checked_sum, saturating_sum, Account, TransactionType, WealthData};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

/// A `from -> to` pair for which no conversion path exists.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct UnitPair {
    pub from: String,
    pub to: String,
}

/// Collects unresolved pairs while converting.
#[derive(Debug)]
struct Tally<'a> {
    fx: Converter<'a>,
    base: &'a str,
    unresolved: BTreeSet<UnitPair>,
}

impl<'a> Tally<'a> {
    fn new(fx: Converter<'a>, base: &'a str) -> Self {
        Self {
            fx,
            base,
            unresolved: BTreeSet::new(),
        }
    }

    fn to_base(&mut self, amount: Decimal, currency: &str) -> Decimal {
        let conversion = self.fx.convert_detailed(amount, currency, self.base);
        if !conversion.is_resolved() {
            self.unresolved.insert(UnitPair {
                from: currency.to_string(),
                to: self.base.to_string(),
            });
        }
        conversion.value
    }

    fn finish(self) -> Vec<UnitPair> {
        self.unresolved.into_iter().collect()
    }
}

/// Per-account values, in the account currency and in the base unit.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: u64,
    pub name: String,
    pub currency: String,
    pub icon: String,
    pub color: String,
    pub balance: Decimal,
    pub balance_base: Decimal,
    pub deposits: Decimal,
    pub deposits_base: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_base: Decimal,
}

/// One account's share of all deposits.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub account_id: u64,
    pub name: String,
    pub color: String,
    pub currency: String,
    pub deposits: Decimal,
    pub deposits_base: Decimal,
    /// Share of the deposit total in percent, clamped to `[0, 100]`.
    pub percent: Decimal,
}

/// The portfolio totals shown on the dashboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub base_unit: String,
    pub total_wealth: Decimal,
    pub total_profit_loss: Decimal,
    pub total_deposits: Decimal,
    pub accounts: Vec<AccountSummary>,
    pub distribution: Vec<DistributionEntry>,
    /// Pairs that could not be converted; their values were counted unconverted.
    pub unresolved: Vec<UnitPair>,
    /// Names of the totals that exceeded the `Decimal` range and were capped.
    pub overflowed: Vec<String>,
}

/// Computes total wealth, total profit/loss, per-account values and the deposit distribution.
///
/// - Total wealth is the sum of every balance converted to the base unit.
/// - Total P/L is the sum of every account P/L converted to the base unit.
/// - Each distribution percentage is the account's converted deposit total over the sum of all
///   converted deposit totals. Accounts without deposits are left out.
pub fn summarize(data: &WealthData, fx: Converter<'_>) -> Summary {
    let base = data.base_unit();
    let mut tally = Tally::new(fx, base);

    let accounts: Vec<AccountSummary> = data
        .accounts()
        .iter()
        .map(|account| account_summary(account, &mut tally))
        .collect();

    let mut overflowed = Vec::new();
    let mut total = |name: &str, values: Vec<Decimal>| {
        checked_sum(values.iter().copied()).unwrap_or_else(|| {
            warn!("The {name} exceeds the supported range and is capped");
            overflowed.push(name.to_string());
            saturating_sum(values)
        })
    };
    let total_wealth = total("total wealth", accounts.iter().map(|a| a.balance_base).collect());
    let total_profit_loss = total(
        "total profit/loss",
        accounts.iter().map(|a| a.profit_loss_base).collect(),
    );
    let total_deposits = total(
        "total deposits",
        accounts.iter().map(|a| a.deposits_base).collect(),
    );

    let distribution = accounts
        .iter()
        .filter(|a| !a.deposits.is_zero())
        .map(|a| DistributionEntry {
            account_id: a.id,
            name: a.name.clone(),
            color: a.color.clone(),
            currency: a.currency.clone(),
            deposits: a.deposits,
            deposits_base: a.deposits_base,
            percent: percent_of(a.deposits_base, total_deposits),
        })
        .collect();

    Summary {
        base_unit: base.to_string(),
        total_wealth,
        total_profit_loss,
        total_deposits,
        accounts,
        distribution,
        unresolved: tally.finish(),
        overflowed,
    }
}

/// Values for a single account.
pub fn summarize_account(
    data: &WealthData,
    account: &Account,
    fx: Converter<'_>,
) -> (AccountSummary, Vec<UnitPair>) {
    let mut tally = Tally::new(fx, data.base_unit());
    let summary = account_summary(account, &mut tally);
    (summary, tally.finish())
}

fn account_summary(account: &Account, tally: &mut Tally<'_>) -> AccountSummary {
    let balance = account.balance();
    let deposits = account.deposits();
    let profit_loss = account.profit_loss();
    AccountSummary {
        id: account.id(),
        name: account.name().to_string(),
        currency: account.currency().to_string(),
        icon: account.icon().to_string(),
        color: account.color().to_string(),
        balance,
        balance_base: tally.to_base(balance, account.currency()),
        deposits,
        deposits_base: tally.to_base(deposits, account.currency()),
        profit_loss,
        profit_loss_base: tally.to_base(profit_loss, account.currency()),
    }
}

/// `part / total * 100` clamped to `[0, 100]`; zero when `total` is zero.
fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(total)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |percent| {
            percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        })
}

/// A transaction annotated with its account, for the recent-activity feed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Activity {
    pub account_id: u64,
    pub account_name: String,
    pub account_currency: String,
    pub color: String,
    pub transaction_id: u64,
    pub r#type: TransactionType,
    pub timestamp: DateTime<Utc>,
    pub description: Option<String>,
    /// The amount signed by its effect on the balance, in the account currency.
    pub signed_amount: Decimal,
    /// The unsigned amount converted to the base unit.
    pub amount_base: Decimal,
}

/// The recent-activity feed: every transaction across all accounts, newest first, limited to
/// `limit` entries when given.
pub fn activity(
    data: &WealthData,
    fx: Converter<'_>,
    limit: Option<usize>,
) -> (Vec<Activity>, Vec<UnitPair>) {
    let mut tally = Tally::new(fx, data.base_unit());
    let mut items: Vec<Activity> = data
        .accounts()
        .iter()
        .flat_map(|account| {
            account.transactions().iter().map(move |tx| (account, tx))
        })
        .map(|(account, tx)| Activity {
            account_id: account.id(),
            account_name: account.name().to_string(),
            account_currency: account.currency().to_string(),
            color: account.color().to_string(),
            transaction_id: tx.id(),
            r#type: tx.r#type(),
            timestamp: tx.timestamp(),
            description: tx.description().map(str::to_string),
            signed_amount: tx.signed_amount(),
            amount_base: tally.to_base(tx.amount(), account.currency()),
        })
        .collect();

    // Stable sort keeps account order for equal timestamps
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    (items, tally.finish())
}

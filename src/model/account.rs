use crate::model::{checked_sum, saturating_sum};
use crate::Result;
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Icons offered for new accounts. The first one is used when none is given.
pub const ICONS: &[&str] = &["💼", "💰", "🏦", "💳", "🎯", "⚡️", "📈", "💵"];

/// Colors offered for new accounts. The first one is used when none is given.
pub const COLORS: &[&str] = &[
    "#8b79f7", "#4caf50", "#ff9800", "#03a9f4", "#e91e63", "#9c27b0",
];

/// Whether a transaction adds to or subtracts from the account balance.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Deposit,
    Withdrawal,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The acquisition price recorded for a transaction, used for profit/loss.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PurchasePrice {
    pub price: Decimal,
    pub unit: String,
}

/// A balance-affecting event within an account.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: u64,
    #[serde(rename = "type")]
    r#type: TransactionType,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    track_price: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purchase_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purchase_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
}

impl Transaction {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn track_price(&self) -> bool {
        self.track_price
    }

    pub fn purchase_price(&self) -> Option<Decimal> {
        self.purchase_price
    }

    pub fn purchase_unit(&self) -> Option<&str> {
        self.purchase_unit.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// The amount with the sign of its effect on the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
        }
    }

    /// The gain of this transaction over its purchase price, counted only when the price was
    /// tracked in `currency`, the currency of the owning account.
    pub fn profit_loss(&self, currency: &str) -> Decimal {
        if self.track_price && self.purchase_unit.as_deref() == Some(currency) {
            self.amount.saturating_sub(self.purchase_price.unwrap_or_default())
        } else {
            Decimal::ZERO
        }
    }
}

/// The fields needed to record a new transaction. The id is assigned by the account.
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub timestamp: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub purchase: Option<PurchasePrice>,
    pub icon: Option<String>,
}

/// A named balance holder denominated in one unit.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    id: u64,
    name: String,
    currency: String,
    /// Always equal to the signed sum of `transactions`. Stored for readers of the data file;
    /// recomputed after every change and on load.
    #[serde(default)]
    balance: Decimal,
    icon: String,
    color: String,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl Account {
    pub(crate) fn new(
        id: u64,
        name: impl Into<String>,
        currency: impl Into<String>,
        icon: Option<String>,
        color: Option<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        let currency = currency.into();
        ensure!(!name.is_empty(), "An account name is required");
        ensure!(!currency.is_empty(), "An account currency is required");
        Ok(Self {
            id,
            name,
            currency,
            balance: Decimal::ZERO,
            icon: non_empty_or(icon, ICONS[0]),
            color: non_empty_or(color, COLORS[0]),
            transactions: Vec::new(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sum of all deposit amounts, in the account currency.
    pub fn deposits(&self) -> Decimal {
        saturating_sum(self.deposit_amounts())
    }

    /// Profit/loss over price-tracked transactions whose purchase unit is the account currency.
    pub fn profit_loss(&self) -> Decimal {
        saturating_sum(self.profit_loss_amounts())
    }

    fn deposit_amounts(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.transactions
            .iter()
            .filter(|t| t.r#type == TransactionType::Deposit)
            .map(|t| t.amount)
    }

    fn profit_loss_amounts(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.transactions
            .iter()
            .map(|t| t.profit_loss(&self.currency))
    }

    /// Fails when the balance, the deposit total or the profit/loss leaves the `Decimal` range.
    fn ensure_totals_fit(&self) -> Result<()> {
        let balance = checked_sum(self.transactions.iter().map(Transaction::signed_amount));
        let deposits = checked_sum(self.deposit_amounts());
        let profit_loss = checked_sum(self.profit_loss_amounts());
        if balance.is_none() || deposits.is_none() || profit_loss.is_none() {
            bail!(
                "The totals of account '{}' would exceed the supported range",
                self.name
            );
        }
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into().trim().to_string();
        ensure!(!name.is_empty(), "An account name cannot be empty");
        self.name = name;
        Ok(())
    }

    pub(crate) fn set_currency(&mut self, currency: impl Into<String>) {
        self.currency = currency.into();
    }

    pub(crate) fn set_icon(&mut self, icon: impl Into<String>) {
        self.icon = non_empty_or(Some(icon.into()), &self.icon);
    }

    pub(crate) fn set_color(&mut self, color: impl Into<String>) {
        self.color = non_empty_or(Some(color.into()), &self.color);
    }

    /// Records a transaction and recomputes the balance. Unit codes in `new.purchase` must
    /// already be validated by the caller.
    pub(crate) fn add_transaction(&mut self, new: NewTransaction) -> Result<&Transaction> {
        ensure!(
            new.amount > Decimal::ZERO,
            "A transaction amount must be greater than zero, got {}",
            new.amount
        );
        if let Some(purchase) = &new.purchase {
            ensure!(
                purchase.price >= Decimal::ZERO,
                "A purchase price cannot be negative, got {}",
                purchase.price
            );
            ensure!(!purchase.unit.is_empty(), "A purchase unit is required");
        }
        let id = self.transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let (track_price, purchase_price, purchase_unit) = match new.purchase {
            Some(p) => (true, Some(p.price), Some(p.unit)),
            None => (false, None, None),
        };
        self.transactions.push(Transaction {
            id,
            r#type: new.r#type,
            amount: new.amount,
            timestamp: new.timestamp.unwrap_or_else(Utc::now),
            description: new
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            track_price,
            purchase_price,
            purchase_unit,
            icon: new.icon,
        });
        if let Err(e) = self.ensure_totals_fit() {
            self.transactions.pop();
            return Err(e);
        }
        self.recompute_balance();
        self.transactions
            .last()
            .context("The transaction list is unexpectedly empty")
    }

    /// Removes the transaction with `id`, recomputes the balance and returns the removed item.
    pub(crate) fn delete_transaction(&mut self, id: u64) -> Result<Transaction> {
        let ix = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .with_context(|| {
                format!("No transaction with id {id} in account '{}'", self.name)
            })?;
        let removed = self.transactions.remove(ix);
        if let Err(e) = self.ensure_totals_fit() {
            self.transactions.insert(ix, removed);
            return Err(e);
        }
        self.recompute_balance();
        Ok(removed)
    }

    /// Sets `balance` to the signed sum of the transactions, capped at the `Decimal` range.
    /// Returns true if it changed.
    pub(crate) fn recompute_balance(&mut self) -> bool {
        let balance = saturating_sum(self.transactions.iter().map(Transaction::signed_amount));
        let changed = balance != self.balance;
        self.balance = balance;
        changed
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(amount: Decimal) -> NewTransaction {
        NewTransaction {
            r#type: TransactionType::Deposit,
            amount,
            ..NewTransaction::default()
        }
    }

    fn withdrawal(amount: Decimal) -> NewTransaction {
        NewTransaction {
            r#type: TransactionType::Withdrawal,
            amount,
            ..NewTransaction::default()
        }
    }

    fn tracked(amount: Decimal, price: Decimal, unit: &str) -> NewTransaction {
        NewTransaction {
            purchase: Some(PurchasePrice {
                price,
                unit: unit.to_string(),
            }),
            ..deposit(amount)
        }
    }

    #[test]
    fn test_new_defaults_icon_and_color() {
        let account = Account::new(1, "Savings", "EUR", None, Some(" ".to_string())).unwrap();
        assert_eq!(account.icon(), ICONS[0]);
        assert_eq!(account.color(), COLORS[0]);
        assert!(account.balance().is_zero());
    }

    #[test]
    fn test_new_requires_name() {
        assert!(Account::new(1, "  ", "EUR", None, None).is_err());
    }

    #[test]
    fn test_balance_deposit_and_withdrawal() {
        let mut account = Account::new(1, "Cash", "USD", None, None).unwrap();
        account.add_transaction(deposit(dec!(100))).unwrap();
        account.add_transaction(withdrawal(dec!(30))).unwrap();
        assert_eq!(account.balance(), dec!(70));
        assert_eq!(account.deposits(), dec!(100));
    }

    #[test]
    fn test_delete_transaction_recomputes_balance() {
        let mut account = Account::new(1, "Cash", "USD", None, None).unwrap();
        account.add_transaction(deposit(dec!(100))).unwrap();
        let id = account.add_transaction(withdrawal(dec!(30))).unwrap().id();
        let removed = account.delete_transaction(id).unwrap();
        assert_eq!(removed.amount(), dec!(30));
        assert_eq!(account.balance(), dec!(100));
        assert!(account.delete_transaction(id).is_err());
    }

    #[test]
    fn test_add_transaction_rejects_balance_overflow() {
        let mut account = Account::new(1, "Vault", "BTC", None, None).unwrap();
        account.add_transaction(deposit(Decimal::MAX)).unwrap();
        let err = account.add_transaction(deposit(dec!(1))).unwrap_err();
        assert!(err.to_string().contains("exceed the supported range"));
        assert_eq!(account.transactions().len(), 1);
        assert_eq!(account.balance(), Decimal::MAX);
    }

    #[test]
    fn test_add_transaction_rejects_deposit_total_overflow() {
        let mut account = Account::new(1, "Vault", "USD", None, None).unwrap();
        account.add_transaction(deposit(Decimal::MAX)).unwrap();
        account.add_transaction(withdrawal(dec!(1))).unwrap();
        // the balance would be back at MAX, but the deposits would pass it
        assert!(account.add_transaction(deposit(dec!(1))).is_err());
        assert_eq!(account.balance(), Decimal::MAX - dec!(1));
        assert_eq!(account.deposits(), Decimal::MAX);
    }

    #[test]
    fn test_add_transaction_rejects_profit_loss_overflow() {
        let mut account = Account::new(1, "Vault", "USD", None, None).unwrap();
        account
            .add_transaction(tracked(dec!(1), Decimal::MAX, "USD"))
            .unwrap();
        assert_eq!(account.profit_loss(), dec!(1) - Decimal::MAX);
        assert!(account
            .add_transaction(tracked(dec!(1), Decimal::MAX, "USD"))
            .is_err());
        assert_eq!(account.transactions().len(), 1);
    }

    #[test]
    fn test_delete_transaction_rejects_balance_overflow() {
        let mut account = Account::new(1, "Vault", "USD", None, None).unwrap();
        let first = account.add_transaction(deposit(Decimal::MAX)).unwrap().id();
        account.add_transaction(withdrawal(Decimal::MAX)).unwrap();
        account.add_transaction(withdrawal(dec!(1))).unwrap();
        assert_eq!(account.balance(), dec!(-1));
        assert!(account.delete_transaction(first).is_err());
        assert_eq!(account.transactions()[0].id(), first);
        assert_eq!(account.balance(), dec!(-1));
    }

    #[test]
    fn test_transaction_ids_increase() {
        let mut account = Account::new(1, "Cash", "USD", None, None).unwrap();
        let a = account.add_transaction(deposit(dec!(1))).unwrap().id();
        let b = account.add_transaction(deposit(dec!(2))).unwrap().id();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut account = Account::new(1, "Cash", "USD", None, None).unwrap();
        assert!(account.add_transaction(deposit(dec!(0))).is_err());
        assert!(account.add_transaction(withdrawal(dec!(-5))).is_err());
        assert!(account.transactions().is_empty());
    }

    #[test]
    fn test_rejects_negative_purchase_price() {
        let mut account = Account::new(1, "Gold", "USD", None, None).unwrap();
        assert!(account
            .add_transaction(tracked(dec!(10), dec!(-1), "USD"))
            .is_err());
    }

    #[test]
    fn test_profit_loss_in_account_currency() {
        let mut account = Account::new(1, "Stocks", "USD", None, None).unwrap();
        account
            .add_transaction(tracked(dec!(150), dec!(100), "USD"))
            .unwrap();
        assert_eq!(account.profit_loss(), dec!(50));
    }

    #[test]
    fn test_profit_loss_ignores_other_purchase_unit() {
        let mut account = Account::new(1, "Stocks", "USD", None, None).unwrap();
        account
            .add_transaction(tracked(dec!(150), dec!(100), "EUR"))
            .unwrap();
        account.add_transaction(deposit(dec!(20))).unwrap();
        assert!(account.profit_loss().is_zero());
    }

    #[test]
    fn test_recompute_balance_repairs_stale_value() {
        let json = r##"{
            "id": 7,
            "name": "Wallet",
            "currency": "BTC",
            "balance": 999,
            "icon": "💰",
            "color": "#4caf50",
            "transactions": [
                {"id": 1, "type": "deposit", "amount": 2, "timestamp": "2025-11-20T10:00:00Z"},
                {"id": 2, "type": "withdrawal", "amount": 0.5, "timestamp": "2025-11-21T10:00:00Z"}
            ]
        }"##;
        let mut account: Account = serde_json::from_str(json).unwrap();
        assert!(account.recompute_balance());
        assert_eq!(account.balance(), dec!(1.5));
        assert!(!account.recompute_balance());
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Withdrawal.to_string(), "withdrawal");
        assert_eq!(
            "deposit".parse::<TransactionType>().unwrap(),
            TransactionType::Deposit
        );
    }
}

//! Types that represent the core data model, such as `Unit`, `ExchangeRate` and `Account`.
mod account;
mod amount;
mod rate;
mod unit;

pub use account::{
    Account, NewTransaction, PurchasePrice, Transaction, TransactionType, COLORS, ICONS,
};
pub use amount::{Amount, AmountError, Precision};
pub(crate) use amount::{checked_sum, saturating_sum};
pub use rate::{ExchangeRate, ExchangeRates};
pub use unit::{normalize_code, Unit, Units};

use crate::Result;
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// The base unit used when none has been chosen.
pub const DEFAULT_BASE_UNIT: &str = "USD";

/// Everything that is persisted: the unit registry, the rate table, the accounts and the chosen
/// base unit. It is stored as one JSON document so that the pieces cannot drift apart through a
/// partial write.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WealthData {
    units: Units,
    exchange_rates: ExchangeRates,
    accounts: Vec<Account>,
    base_unit: String,
}

impl Default for WealthData {
    fn default() -> Self {
        Self {
            units: Units::default(),
            exchange_rates: ExchangeRates::default(),
            accounts: Vec::new(),
            base_unit: DEFAULT_BASE_UNIT.to_string(),
        }
    }
}

impl WealthData {
    /// Creates a document from its parts, recomputing balances.
    pub fn new(
        units: Units,
        exchange_rates: ExchangeRates,
        accounts: Vec<Account>,
        base_unit: impl AsRef<str>,
    ) -> Self {
        let mut data = Self {
            units,
            exchange_rates,
            accounts,
            base_unit: normalize_code(base_unit),
        };
        data.normalize();
        data
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn exchange_rates(&self) -> &ExchangeRates {
        &self.exchange_rates
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, id: u64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id() == id)
    }

    /// The unit totals are shown in. Falls back to the first registered unit when the stored code
    /// is no longer a known unit, and to `USD` when the registry is empty.
    pub fn base_unit(&self) -> &str {
        if self.units.contains(&self.base_unit) {
            return &self.base_unit;
        }
        self.units
            .first()
            .map(Unit::code)
            .unwrap_or(DEFAULT_BASE_UNIT)
    }

    /// Recomputes every account balance. Returns the number of balances that were stale.
    pub fn normalize(&mut self) -> usize {
        let repaired = self
            .accounts
            .iter_mut()
            .map(Account::recompute_balance)
            .filter(|changed| *changed)
            .count();
        if repaired > 0 {
            debug!("Recomputed {repaired} stale account balance(s)");
        }
        repaired
    }

    pub fn set_base_unit(&mut self, code: &str) -> Result<&Unit> {
        let unit = self
            .units
            .get(code)
            .with_context(|| format!("Unknown unit '{}'", normalize_code(code)))?;
        self.base_unit = unit.code().to_string();
        Ok(unit)
    }

    // ---------------------------------------------------------------------------------------------
    // Units
    // ---------------------------------------------------------------------------------------------

    pub fn add_unit(&mut self, unit: Unit) -> Result<&Unit> {
        self.units.add(unit)
    }

    pub fn update_unit(
        &mut self,
        code: &str,
        name: Option<String>,
        symbol: Option<String>,
    ) -> Result<&Unit> {
        self.units.update(code, name, symbol)
    }

    /// Deletes a unit together with every exchange rate that references it. Refused while an
    /// account is denominated in the unit or while it is the base unit.
    pub fn delete_unit(&mut self, code: &str) -> Result<(Unit, Vec<ExchangeRate>)> {
        let code = normalize_code(code);
        ensure!(
            self.units.contains(&code),
            "No unit with the code '{code}'"
        );
        let holders: Vec<&str> = self
            .accounts
            .iter()
            .filter(|a| a.currency() == code)
            .map(Account::name)
            .collect();
        if !holders.is_empty() {
            bail!(
                "Unit '{code}' is the currency of account(s) {}; change or delete them first",
                holders.join(", ")
            );
        }
        ensure!(
            self.base_unit() != code,
            "Unit '{code}' is the base unit; choose another base unit first"
        );
        let unit = self.units.remove(&code)?;
        let rates = self.exchange_rates.delete_for_unit(&code);
        Ok((unit, rates))
    }

    // ---------------------------------------------------------------------------------------------
    // Exchange rates
    // ---------------------------------------------------------------------------------------------

    pub fn add_rate(
        &mut self,
        from: &str,
        to: &str,
        value: rust_decimal::Decimal,
    ) -> Result<&ExchangeRate> {
        self.exchange_rates.add(&self.units, from, to, value)
    }

    pub fn update_rate(&mut self, id: u64, value: rust_decimal::Decimal) -> Result<&ExchangeRate> {
        self.exchange_rates.update(id, value)
    }

    pub fn delete_rate(&mut self, id: u64) -> Result<ExchangeRate> {
        self.exchange_rates.delete(id)
    }

    // ---------------------------------------------------------------------------------------------
    // Accounts and transactions
    // ---------------------------------------------------------------------------------------------

    pub fn add_account(
        &mut self,
        name: &str,
        currency: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> Result<&Account> {
        let currency = self.known_unit(currency)?;
        let id = self.accounts.iter().map(Account::id).max().unwrap_or(0) + 1;
        let account = Account::new(id, name, currency, icon, color)?;
        self.accounts.push(account);
        self.accounts
            .last()
            .context("The account list is unexpectedly empty")
    }

    /// Applies the given changes to an account. `None` leaves a field as it is.
    pub fn update_account(
        &mut self,
        id: u64,
        name: Option<String>,
        currency: Option<String>,
        icon: Option<String>,
        color: Option<String>,
    ) -> Result<&Account> {
        let currency = currency.map(|c| self.known_unit(&c)).transpose()?;
        let account = self.account_mut(id)?;
        if let Some(name) = name {
            account.set_name(name)?;
        }
        if let Some(currency) = currency {
            account.set_currency(currency);
        }
        if let Some(icon) = icon {
            account.set_icon(icon);
        }
        if let Some(color) = color {
            account.set_color(color);
        }
        account.recompute_balance();
        Ok(account)
    }

    pub fn delete_account(&mut self, id: u64) -> Result<Account> {
        let ix = self
            .accounts
            .iter()
            .position(|a| a.id() == id)
            .with_context(|| format!("No account with id {id}"))?;
        Ok(self.accounts.remove(ix))
    }

    /// Records a transaction in the account with `account_id`. A purchase unit, when given, must
    /// be a known unit.
    pub fn add_transaction(
        &mut self,
        account_id: u64,
        mut new: NewTransaction,
    ) -> Result<&Transaction> {
        if let Some(purchase) = new.purchase.as_mut() {
            purchase.unit = self.known_unit(&purchase.unit)?;
        }
        self.account_mut(account_id)?.add_transaction(new)
    }

    pub fn delete_transaction(&mut self, account_id: u64, id: u64) -> Result<Transaction> {
        self.account_mut(account_id)?.delete_transaction(id)
    }

    fn account_mut(&mut self, id: u64) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id() == id)
            .with_context(|| format!("No account with id {id}"))
    }

    /// Returns the normalized code if it names a registered unit.
    fn known_unit(&self, code: &str) -> Result<String> {
        let code = normalize_code(code);
        ensure!(!code.is_empty(), "A unit code is required");
        ensure!(self.units.contains(&code), "Unknown unit '{code}'");
        Ok(code)
    }

    // ---------------------------------------------------------------------------------------------
    // Referential integrity
    // ---------------------------------------------------------------------------------------------

    /// Lists every reference to a unit that does not exist, and every pair of units with more
    /// than one rate. A hand-edited data file is the usual cause.
    pub fn check(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        if !self.units.contains(&self.base_unit) {
            issues.push(Issue::UnknownBaseUnit {
                code: self.base_unit.clone(),
            });
        }
        for rate in self.exchange_rates.data() {
            for code in [rate.from(), rate.to()] {
                if !self.units.contains(code) {
                    issues.push(Issue::UnknownRateUnit {
                        rate_id: rate.id(),
                        code: code.to_string(),
                    });
                }
            }
        }
        let rates = self.exchange_rates.data();
        for (ix, a) in rates.iter().enumerate() {
            for b in &rates[ix + 1..] {
                if a.connects(b.from(), b.to()) {
                    issues.push(Issue::DuplicateRate {
                        first_id: a.id(),
                        second_id: b.id(),
                    });
                }
            }
        }
        for account in &self.accounts {
            if !self.units.contains(account.currency()) {
                issues.push(Issue::UnknownAccountCurrency {
                    account_id: account.id(),
                    code: account.currency().to_string(),
                });
            }
            for tx in account.transactions() {
                if let Some(unit) = tx.purchase_unit() {
                    if !self.units.contains(unit) {
                        issues.push(Issue::UnknownPurchaseUnit {
                            account_id: account.id(),
                            transaction_id: tx.id(),
                            code: unit.to_string(),
                        });
                    }
                }
            }
        }
        issues
    }
}

/// A referential-integrity problem found by `WealthData::check`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Issue {
    UnknownBaseUnit {
        code: String,
    },
    UnknownRateUnit {
        rate_id: u64,
        code: String,
    },
    DuplicateRate {
        first_id: u64,
        second_id: u64,
    },
    UnknownAccountCurrency {
        account_id: u64,
        code: String,
    },
    UnknownPurchaseUnit {
        account_id: u64,
        transaction_id: u64,
        code: String,
    },
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::UnknownBaseUnit { code } => write!(f, "base unit '{code}' is not a unit"),
            Issue::UnknownRateUnit { rate_id, code } => {
                write!(f, "rate {rate_id} references unknown unit '{code}'")
            }
            Issue::DuplicateRate {
                first_id,
                second_id,
            } => write!(
                f,
                "rates {first_id} and {second_id} connect the same pair of units"
            ),
            Issue::UnknownAccountCurrency { account_id, code } => {
                write!(f, "account {account_id} is held in unknown unit '{code}'")
            }
            Issue::UnknownPurchaseUnit {
                account_id,
                transaction_id,
                code,
            } => write!(
                f,
                "transaction {transaction_id} of account {account_id} was purchased in unknown \
                unit '{code}'"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(amount: rust_decimal::Decimal) -> NewTransaction {
        NewTransaction {
            r#type: TransactionType::Deposit,
            amount,
            ..NewTransaction::default()
        }
    }

    #[test]
    fn test_default_document() {
        let data = WealthData::default();
        assert_eq!(data.units().len(), 4);
        assert_eq!(data.exchange_rates().len(), 3);
        assert!(data.accounts().is_empty());
        assert_eq!(data.base_unit(), "USD");
        assert!(data.check().is_empty());
    }

    #[test]
    fn test_missing_entries_fall_back_to_defaults() {
        let data: WealthData = serde_json::from_str(r#"{"baseUnit": "EUR"}"#).unwrap();
        assert_eq!(data.units().len(), 4);
        assert_eq!(data.exchange_rates().len(), 3);
        assert_eq!(data.base_unit(), "EUR");
    }

    #[test]
    fn test_base_unit_falls_back_to_first_unit() {
        let data = WealthData::new(Units::default(), ExchangeRates::empty(), Vec::new(), "IRT");
        assert_eq!(data.base_unit(), "USD");
        assert_eq!(
            data.check(),
            vec![Issue::UnknownBaseUnit {
                code: "IRT".to_string()
            }]
        );
    }

    #[test]
    fn test_set_base_unit() {
        let mut data = WealthData::default();
        assert_eq!(data.set_base_unit("gbp").unwrap().code(), "GBP");
        assert_eq!(data.base_unit(), "GBP");
        assert!(data.set_base_unit("XYZ").is_err());
        assert_eq!(data.base_unit(), "GBP");
    }

    #[test]
    fn test_delete_unit_cascades_to_rates() {
        let mut data = WealthData::default();
        data.add_rate("BTC", "EUR", dec!(40000)).unwrap();
        let (unit, rates) = data.delete_unit("EUR").unwrap();
        assert_eq!(unit.code(), "EUR");
        assert_eq!(rates.len(), 2);
        assert!(data
            .exchange_rates()
            .data()
            .iter()
            .all(|r| r.from() != "EUR" && r.to() != "EUR"));
        assert!(data.check().is_empty());
    }

    #[test]
    fn test_delete_unit_refused_while_held() {
        let mut data = WealthData::default();
        data.add_account("Euro savings", "EUR", None, None).unwrap();
        let err = data.delete_unit("EUR").unwrap_err();
        assert!(err.to_string().contains("Euro savings"));
        assert!(data.units().contains("EUR"));
    }

    #[test]
    fn test_delete_unit_refused_for_base_unit() {
        let mut data = WealthData::default();
        let err = data.delete_unit("USD").unwrap_err();
        assert!(err.to_string().contains("base unit"));
    }

    #[test]
    fn test_add_rate_then_reverse_is_rejected() {
        let mut data = WealthData::new(
            Units::default(),
            ExchangeRates::empty(),
            Vec::new(),
            "USD",
        );
        data.add_rate("USD", "EUR", dec!(0.92)).unwrap();
        let err = data.add_rate("EUR", "USD", dec!(1.09)).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_add_account_requires_known_currency() {
        let mut data = WealthData::default();
        assert!(data.add_account("Toman", "IRT", None, None).is_err());
        let account = data.add_account("Wallet", "btc", None, None).unwrap();
        assert_eq!(account.currency(), "BTC");
        assert_eq!(account.id(), 1);
    }

    #[test]
    fn test_update_account() {
        let mut data = WealthData::default();
        let id = data.add_account("Wallet", "USD", None, None).unwrap().id();
        let account = data
            .update_account(
                id,
                Some("Travel".to_string()),
                Some("eur".to_string()),
                Some("🎯".to_string()),
                None,
            )
            .unwrap();
        assert_eq!(account.name(), "Travel");
        assert_eq!(account.currency(), "EUR");
        assert_eq!(account.icon(), "🎯");
        assert_eq!(account.color(), COLORS[0]);
        assert!(data
            .update_account(id, None, Some("XYZ".to_string()), None, None)
            .is_err());
        assert!(data.update_account(99, None, None, None, None).is_err());
    }

    #[test]
    fn test_transactions_through_document() {
        let mut data = WealthData::default();
        let id = data.add_account("Cash", "USD", None, None).unwrap().id();
        data.add_transaction(id, deposit(dec!(100))).unwrap();
        let tx = data
            .add_transaction(
                id,
                NewTransaction {
                    r#type: TransactionType::Withdrawal,
                    amount: dec!(30),
                    ..NewTransaction::default()
                },
            )
            .unwrap()
            .id();
        assert_eq!(data.account(id).unwrap().balance(), dec!(70));
        data.delete_transaction(id, tx).unwrap();
        assert_eq!(data.account(id).unwrap().balance(), dec!(100));
        assert!(data.add_transaction(42, deposit(dec!(1))).is_err());
    }

    #[test]
    fn test_add_transaction_checks_purchase_unit() {
        let mut data = WealthData::default();
        let id = data.add_account("Cash", "USD", None, None).unwrap().id();
        let new = NewTransaction {
            purchase: Some(PurchasePrice {
                price: dec!(10),
                unit: "IRT".to_string(),
            }),
            ..deposit(dec!(20))
        };
        assert!(data.add_transaction(id, new).is_err());
    }

    #[test]
    fn test_delete_account() {
        let mut data = WealthData::default();
        let id = data.add_account("Cash", "USD", None, None).unwrap().id();
        assert_eq!(data.delete_account(id).unwrap().name(), "Cash");
        assert!(data.delete_account(id).is_err());
    }

    #[test]
    fn test_check_reports_dangling_references() {
        let json = r##"{
            "units": [
                {"code": "USD", "name": "US Dollar", "symbol": "$"},
                {"code": "EUR", "name": "Euro", "symbol": "€"}
            ],
            "exchangeRates": [
                {"id": 1, "from": "EUR", "to": "USD", "value": 1.09, "updated": "2025-11-25"},
                {"id": 2, "from": "USD", "to": "EUR", "value": 0.92, "updated": "2025-11-25"},
                {"id": 3, "from": "GBP", "to": "USD", "value": 1.27, "updated": "2025-11-25"}
            ],
            "accounts": [
                {
                    "id": 1, "name": "Pounds", "currency": "GBP", "balance": 0,
                    "icon": "🏦", "color": "#8b79f7", "transactions": []
                }
            ],
            "baseUnit": "USD"
        }"##;
        let data: WealthData = serde_json::from_str(json).unwrap();
        let issues = data.check();
        assert_eq!(
            issues,
            vec![
                Issue::UnknownRateUnit {
                    rate_id: 3,
                    code: "GBP".to_string()
                },
                Issue::DuplicateRate {
                    first_id: 1,
                    second_id: 2
                },
                Issue::UnknownAccountCurrency {
                    account_id: 1,
                    code: "GBP".to_string()
                },
            ]
        );
        assert_eq!(
            issues[1].to_string(),
            "rates 1 and 2 connect the same pair of units"
        );
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(WealthData::default()).unwrap();
        let object = json.as_object().unwrap();
        for key in ["units", "exchangeRates", "accounts", "baseUnit"] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}

//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{NewTransaction, PurchasePrice, TransactionType, WealthData};
use crate::store::MemoryStore;
use crate::Config;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Test environment that sets up a wealthflow home directory with Config and a seeded data file.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and the default data document.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("wealthflow");
        let config = Config::create(&root, None).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Creates a test environment whose data document lives in memory.
    pub async fn in_memory(data: WealthData) -> Self {
        let Self { _temp_dir, config } = Self::new().await;
        Self {
            _temp_dir,
            config: config.with_store(MemoryStore::new(data)),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Loads the current data document.
    pub async fn data(&self) -> WealthData {
        self.config.store().load().await.unwrap()
    }

    /// Replaces the data document.
    pub async fn set_data(&self, data: &WealthData) {
        self.config.store().save(data).await.unwrap()
    }

    /// Number of files in the backups directory.
    pub async fn backup_count(&self) -> usize {
        let mut count = 0;
        let mut dir = tokio::fs::read_dir(self.config.backups()).await.unwrap();
        while dir.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    /// Inserts a USD account "Cash" (deposit 100, withdrawal 30) and a EUR account "Euro"
    /// (deposits 50 and 150, the latter tracked at a purchase price of 100 EUR). Returns the
    /// account ids.
    pub async fn insert_sample_accounts(&self) -> (u64, u64) {
        let mut data = self.data().await;
        let usd = data.add_account("Cash", "USD", None, None).unwrap().id();
        let eur = data.add_account("Euro", "EUR", None, None).unwrap().id();
        data.add_transaction(usd, sample_tx(1, TransactionType::Deposit, dec!(100)))
            .unwrap();
        data.add_transaction(usd, sample_tx(3, TransactionType::Withdrawal, dec!(30)))
            .unwrap();
        data.add_transaction(eur, sample_tx(2, TransactionType::Deposit, dec!(50)))
            .unwrap();
        data.add_transaction(
            eur,
            NewTransaction {
                purchase: Some(PurchasePrice {
                    price: dec!(100),
                    unit: "EUR".to_string(),
                }),
                ..sample_tx(4, TransactionType::Deposit, dec!(150))
            },
        )
        .unwrap();
        self.set_data(&data).await;
        (usd, eur)
    }
}

/// A transaction timestamped at noon on the given day of November 2025.
pub fn sample_tx(day: u32, r#type: TransactionType, amount: Decimal) -> NewTransaction {
    NewTransaction {
        r#type,
        amount,
        timestamp: Utc.with_ymd_and_hms(2025, 11, day, 12, 0, 0).single(),
        ..NewTransaction::default()
    }
}

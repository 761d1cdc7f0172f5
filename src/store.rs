//! Persistence of the `WealthData` document.
//!
//! The `Store` trait is deliberately tiny: load the whole document, save the whole document.
//! `JsonStore` keeps it in a single JSON file that is replaced atomically. `MemoryStore` holds it
//! in memory, which lets the whole app run top-to-bottom without touching the data file.

use crate::model::WealthData;
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, trace, warn};

#[async_trait::async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Loads the document. Balances are recomputed and integrity issues are logged.
    async fn load(&self) -> Result<WealthData>;

    /// Replaces the stored document with `data`.
    async fn save(&self, data: &WealthData) -> Result<()>;
}

/// Stores the document as pretty-printed JSON at `path`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Store for JsonStore {
    async fn load(&self) -> Result<WealthData> {
        trace!("Loading {}", self.path.display());
        if !self.path.is_file() {
            debug!(
                "No data file at {}, starting from defaults",
                self.path.display()
            );
            return Ok(WealthData::default());
        }
        let mut data: WealthData = utils::deserialize(&self.path).await?;
        prepare(&mut data);
        Ok(data)
    }

    async fn save(&self, data: &WealthData) -> Result<()> {
        trace!("Saving {}", self.path.display());
        let json =
            serde_json::to_string_pretty(data).context("Failed to serialize the data document")?;
        utils::write_atomic(&self.path, json).await
    }
}

/// Holds the document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Option<WealthData>>,
}

impl MemoryStore {
    pub fn new(data: WealthData) -> Self {
        Self {
            data: Mutex::new(Some(data)),
        }
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Result<WealthData> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("The in-memory store lock is poisoned"))?;
        let mut data = guard.clone().unwrap_or_default();
        prepare(&mut data);
        Ok(data)
    }

    async fn save(&self, data: &WealthData) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("The in-memory store lock is poisoned"))?;
        *guard = Some(data.clone());
        Ok(())
    }
}

/// Recomputes balances and reports any dangling references.
fn prepare(data: &mut WealthData) {
    data.normalize();
    for issue in data.check() {
        warn!("Data integrity: {issue}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_json_store_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("wealth.json"));
        let data = store.load().await.unwrap();
        assert_eq!(data, WealthData::default());
    }

    #[tokio::test]
    async fn test_json_store_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("wealth.json"));
        let mut data = WealthData::default();
        data.add_account("Cash", "USD", None, None).unwrap();
        data.add_rate("BTC", "EUR", dec!(40000)).unwrap();
        store.save(&data).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(data, loaded);
    }

    #[tokio::test]
    async fn test_json_store_recomputes_balance_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wealth.json");
        let json = r##"{
            "accounts": [{
                "id": 1, "name": "Cash", "currency": "USD", "balance": 5,
                "icon": "💵", "color": "#4caf50",
                "transactions": [
                    {"id": 1, "type": "deposit", "amount": 100, "timestamp": "2025-11-20T10:00:00Z"},
                    {"id": 2, "type": "withdrawal", "amount": 30, "timestamp": "2025-11-21T10:00:00Z"}
                ]
            }]
        }"##;
        utils::write(&path, json).await.unwrap();
        let data = JsonStore::new(&path).load().await.unwrap();
        assert_eq!(data.account(1).unwrap().balance(), dec!(70));
        assert_eq!(data.units().len(), 4);
    }

    #[tokio::test]
    async fn test_json_store_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wealth.json");
        utils::write(&path, "{ not json").await.unwrap();
        let err = JsonStore::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::default();
        let mut data = store.load().await.unwrap();
        data.add_account("Cash", "USD", None, None).unwrap();
        store.save(&data).await.unwrap();
        assert_eq!(store.load().await.unwrap().accounts().len(), 1);
    }
}

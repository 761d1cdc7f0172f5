//! Command handlers for the wealth CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler loads the data
//! document from the `Store`, performs one operation and, when something changed, backs up the
//! previous document and saves the new one.

mod accounts;
mod check;
mod init;
mod rates;
mod report;
mod settings;
mod table;
mod transactions;
mod units;

use crate::backup::WEALTH;
use crate::fx::Converter;
use crate::model::WealthData;
use crate::portfolio::UnitPair;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use accounts::{account_add, account_delete, account_list, account_show, account_update};
pub use accounts::{AccountChanges, AccountDetail};
pub use check::check;
pub use init::init;
pub use rates::{rate_add, rate_delete, rate_list, rate_update};
pub use report::{activity, convert, summary, Converted};
pub use settings::base_unit;
pub use table::Rows;
pub use transactions::{purchase, tx_add, tx_delete};
pub use units::{unit_add, unit_delete, unit_list, unit_update, UnitDeleted};

/// The output type for a command. This allows the command to return a consistent message,
/// optionally structured data, and optionally a rendered report.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// A report meant for stdout, e.g. a table.
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

/// How list and report commands print their rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// A markdown table.
    #[default]
    Table,
    /// Comma separated values with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            output: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            output: None,
        }
    }

    /// Attach a rendered report that `print` writes to stdout.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the rendered report, if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Print the message to `info!`, the structured data (if it exists) as JSON to `debug!`, and
    /// the rendered report (if it exists) to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
        if let Some(output) = self.output() {
            println!("{output}");
        }
    }
}

/// Loads the data document.
async fn load(config: &Config) -> Result<WealthData> {
    config.store().load().await
}

/// A converter over the document's rates that bridges through the configured pivot unit.
fn converter<'a>(config: &'a Config, data: &'a WealthData) -> Converter<'a> {
    Converter::with_pivot(data.exchange_rates(), config.pivot_unit())
}

/// Logs each pair whose values were counted unconverted.
fn warn_unresolved(unresolved: &[UnitPair]) {
    for pair in unresolved {
        warn!(
            "No exchange rate path from {} to {}, those values are counted unconverted. Add a \
            rate with 'wealth rate add'.",
            pair.from, pair.to
        );
    }
}

/// Loads the data document, applies `f` to it and saves the result. The document as it was
/// before is written to the backups directory first. Nothing is written when `f` fails.
async fn mutate<T, F>(config: &Config, f: F) -> Result<T>
where
    F: FnOnce(&mut WealthData) -> Result<T>,
{
    let before = load(config).await?;
    let mut after = before.clone();
    let value = f(&mut after)?;
    if after == before {
        debug!("Nothing changed, not saving");
        return Ok(value);
    }
    config.backup().save_json(WEALTH, &before).await?;
    config.store().save(&after).await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use anyhow::bail;

    #[test]
    fn test_out_from_str() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
        assert!(out.output().is_none());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_mutate_saves_and_backs_up() {
        let env = TestEnv::new().await;
        let config = env.config();
        let id = mutate(&config, |data| {
            Ok(data.add_account("Cash", "USD", None, None)?.id())
        })
        .await
        .unwrap();
        assert_eq!(id, 1);
        assert_eq!(env.data().await.accounts().len(), 1);
        assert_eq!(env.backup_count().await, 1);
    }

    #[tokio::test]
    async fn test_mutate_error_leaves_data_untouched() {
        let env = TestEnv::new().await;
        let config = env.config();
        let result: Result<()> = mutate(&config, |data| {
            data.add_account("Cash", "USD", None, None)?;
            bail!("boom")
        })
        .await;
        assert!(result.is_err());
        assert!(env.data().await.accounts().is_empty());
        assert_eq!(env.backup_count().await, 0);
    }

    #[tokio::test]
    async fn test_mutate_without_changes_does_not_save() {
        let env = TestEnv::new().await;
        mutate(&env.config(), |_| Ok(())).await.unwrap();
        assert_eq!(env.backup_count().await, 0);
    }
}

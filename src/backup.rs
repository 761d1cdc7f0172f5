//! Rotating backups of the data document, taken before each write.

use crate::model::WealthData;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;
use tracing::debug;

/// Prefix for backups of `wealth.json`.
pub const WEALTH: &str = "wealth";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `WealthData` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files. With
    /// `backup_copies` set to zero nothing is written.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, data: &WealthData) -> Result<Option<PathBuf>> {
        if self.backup_copies == 0 {
            return Ok(None);
        }
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.json");
        let path = self.backups_dir.join(&filename);

        let json = serde_json::to_string_pretty(data)
            .context("Failed to serialize the data document to JSON")?;
        utils::write(&path, json).await?;
        debug!("Wrote backup {}", path.display());

        self.rotate(prefix).await?;

        Ok(Some(path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            debug!("Removing old backup {}", path.display());
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    remainder.strip_suffix(".json")?.parse().ok()
}

/// Checks if a filename is a JSON backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(".json")
}

use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its backups subdirectory, an initial `config.json` with default
/// settings and a `wealth.json` seeded with the default units and exchange rates.
///
/// # Arguments
/// - `wealth_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/wealthflow`
/// - `base_unit` - The base unit of the seeded data, `USD` when not given.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operations fail.
pub async fn init(wealth_home: &Path, base_unit: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(wealth_home, base_unit)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the wealthflow directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("w");
        let out = init(&home, Some("GBP")).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        let config = Config::load(&home).await.unwrap();
        let data = config.store().load().await.unwrap();
        assert_eq!(data.base_unit(), "GBP");
        assert!(init(&home, None).await.is_err());
    }
}

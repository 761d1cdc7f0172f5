use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs::ReadDir;

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Write a file by first writing a sibling temporary file and then renaming it over `path`, so
/// that a reader never sees a partially written file.
pub(crate) async fn write_atomic(
    path: impl AsRef<Path>,
    contents: impl AsRef<[u8]>,
) -> Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .with_context(|| format!("No file name in path {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    write(&tmp, contents).await?;
    rename(&tmp, path).await
}

/// Read a file to a `String`.
pub async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub async fn deserialize<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Basically move a file. Renames `from` -> `to`.
pub async fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    tokio::fs::rename(from.as_ref(), to.as_ref())
        .await
        .with_context(|| {
            format!(
                "Unable to move file from '{}' to '{}'",
                from.as_ref().to_string_lossy(),
                to.as_ref().to_string_lossy()
            )
        })
}

pub(crate) async fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove file {}", path.display()))
}

pub(crate) async fn make_dir(p: impl AsRef<Path>) -> Result<()> {
    let p = p.as_ref();
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

pub(crate) async fn read_dir(p: impl AsRef<Path>) -> Result<ReadDir> {
    let p = p.as_ref();
    tokio::fs::read_dir(p)
        .await
        .with_context(|| format!("Unable to read directory {}", p.display()))
}

pub(crate) async fn canonicalize(p: impl AsRef<Path>) -> Result<PathBuf> {
    let p = p.as_ref();
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

use crate::commands::Out;
use crate::model::Ledger;
use crate::persist::LedgerFile;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `.backups` subdirectory, an initial `config.json` and a
/// `ledger.json` holding an empty year.
///
/// # Arguments
/// - `home` - The directory that will be the home directory, e.g. `$HOME/expenses`
/// - `year` - The year being tracked.
/// - `rows` - How many row slots each month starts with.
/// - `remote_url` - Base URL of the remote record service, if one is used.
/// - `sample` - When true, January and February are filled with demonstration rows.
///
/// # Errors
/// - Returns an error if the home directory already has a config, or if any file operations fail.
pub async fn init(
    home: &Path,
    year: i32,
    rows: usize,
    remote_url: Option<&str>,
    sample: bool,
) -> Result<Out<()>> {
    let config = Config::create(home, year, rows, remote_url)
        .await
        .context("Unable to create the home directory and config")?;

    let ledger = if sample {
        Ledger::sample(rows)?
    } else {
        Ledger::new(rows)
    };
    LedgerFile::new(&config).save(&ledger).await?;

    Ok(format!(
        "Created the {year} expense ledger in {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Month;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config_and_ledger() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        init(&home, 2025, 10, None, false).await.unwrap();

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.year(), 2025);
        let ledger = LedgerFile::new(&config).load().await.unwrap();
        assert_eq!(ledger.period(Month::April).len(), 10);
        assert_eq!(ledger.active_row_count(), 0);
    }

    #[tokio::test]
    async fn test_init_with_sample() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        init(&home, 2024, 25, None, true).await.unwrap();

        let config = Config::load(&home).await.unwrap();
        let ledger = LedgerFile::new(&config).load().await.unwrap();
        assert_eq!(ledger.active_row_count(), 14);
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        init(&home, 2024, 25, None, false).await.unwrap();
        assert!(init(&home, 2024, 25, None, false).await.is_err());
    }
}

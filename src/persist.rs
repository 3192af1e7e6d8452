//! Reads and writes the ledger snapshot at `$EXPENSES_HOME/ledger.json`.

use crate::model::Ledger;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Infix of the name an unreadable ledger file is moved to.
const CORRUPT: &str = ".corrupt-";

/// The persisted snapshot of the whole ledger.
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
    rows_per_month: usize,
}

impl LedgerFile {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.ledger_path().to_path_buf(),
            rows_per_month: config.rows_per_month(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger. A missing, unreadable or malformed file is not an error: it is logged
    /// and a default ledger is returned instead.
    ///
    /// A file that exists but cannot be loaded is first moved to
    /// `ledger.json.corrupt-YYYY-MM-DD-HHMMSS.mmm` next to it, so a later `save` never writes
    /// over it.
    pub async fn load_or_default(&self) -> Ledger {
        if !self.path.is_file() {
            debug!(
                "No ledger at {}, starting with an empty one",
                self.path.display()
            );
            return Ledger::new(self.rows_per_month);
        }
        match self.load().await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("Unable to load the ledger, starting with an empty one: {e:#}");
                match self.set_aside().await {
                    Ok(aside) => warn!("Moved the unreadable ledger to {}", aside.display()),
                    Err(e) => warn!("Unable to move the unreadable ledger aside: {e:#}"),
                }
                Ledger::new(self.rows_per_month)
            }
        }
    }

    /// Renames the ledger file to a timestamped `.corrupt-` sibling and returns the new path.
    async fn set_aside(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .with_context(|| format!("No file name in {}", self.path.display()))?;
        let stamp = Local::now().format("%Y-%m-%d-%H%M%S%.3f");
        let aside = self.path.with_file_name(format!(
            "{}{CORRUPT}{stamp}",
            file_name.to_string_lossy()
        ));
        utils::rename(&self.path, &aside).await?;
        Ok(aside)
    }

    /// Loads the ledger, failing if the file is missing or malformed.
    pub async fn load(&self) -> Result<Ledger> {
        utils::deserialize(&self.path).await
    }

    /// Rewrites the whole snapshot. On failure the file on disk is left as it was.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string_pretty(ledger).context("Unable to serialize the ledger")?;
        utils::write_replace(&self.path, json)
            .await
            .context("Unable to save the ledger")?;
        debug!("Saved the ledger to {}", self.path.display());
        Ok(())
    }
}

/// Reads a ledger snapshot from any JSON file, e.g. one given to `import`.
pub async fn read_ledger(path: &Path) -> Result<Ledger> {
    utils::deserialize(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Field, Month};
    use crate::test::TestEnv;

    /// Files next to the ledger that an unreadable ledger was moved to.
    async fn set_aside_files(file: &LedgerFile) -> Vec<PathBuf> {
        let dir = file.path().parent().unwrap();
        let mut entries = utils::read_dir(dir).await.unwrap();
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            if entry.file_name().to_string_lossy().starts_with("ledger.json.corrupt-") {
                found.push(entry.path());
            }
        }
        found
    }

    #[tokio::test]
    async fn test_missing_file_gives_default() {
        let env = TestEnv::new().await;
        let file = LedgerFile::new(&env.config());
        let ledger = file.load_or_default().await;
        assert_eq!(ledger, Ledger::new(25));
        assert!(file.load().await.is_err());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let env = TestEnv::new().await;
        let file = LedgerFile::new(&env.config());
        let ledger = Ledger::sample(25).unwrap();
        file.save(&ledger).await.unwrap();
        assert_eq!(file.load().await.unwrap(), ledger);
        assert_eq!(file.path(), env.config().ledger_path());
    }

    #[tokio::test]
    async fn test_malformed_file_gives_default() {
        let env = TestEnv::new().await;
        let file = LedgerFile::new(&env.config());
        utils::write(file.path(), r#"{"January": []}"#).await.unwrap();
        let ledger = file.load_or_default().await;
        assert_eq!(ledger.period(Month::January).len(), 25);
        assert_eq!(ledger.active_row_count(), 0);

        assert!(!file.path().exists());
        let aside = set_aside_files(&file).await;
        assert_eq!(aside.len(), 1);
        assert_eq!(utils::read(&aside[0]).await.unwrap(), r#"{"January": []}"#);
    }

    #[tokio::test]
    async fn test_unreadable_ledger_survives_an_edit() {
        let env = TestEnv::with_sample().await;
        let file = LedgerFile::new(&env.config());
        let text = utils::read(file.path()).await.unwrap();
        let broken = text.replacen(r#""deposit": "3500.00""#, r#""deposit": 3500"#, 1);
        assert_ne!(broken, text);
        utils::write(file.path(), &broken).await.unwrap();

        crate::commands::set(
            env.config(),
            Month::March,
            1,
            Field::Amount(Category::Food),
            "5",
        )
        .await
        .unwrap();

        let aside = set_aside_files(&file).await;
        assert_eq!(aside.len(), 1);
        let kept = utils::read(&aside[0]).await.unwrap();
        assert_eq!(kept, broken);
        assert!(kept.contains("City Transit"));
        assert_eq!(file.load().await.unwrap().active_row_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_flat_json() {
        let env = TestEnv::with_sample().await;
        let text = utils::read(env.config().ledger_path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["January"][0]["receiver"], "City Transit");
        assert_eq!(value["January"][0]["transport"], "85.00");
        assert_eq!(value["December"].as_array().unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_read_ledger_rejects_garbage() {
        let env = TestEnv::new().await;
        let path = env.scratch("garbage.json");
        utils::write(&path, "not json").await.unwrap();
        assert!(read_ledger(&path).await.is_err());
    }
}

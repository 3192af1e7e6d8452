//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and holds the tracked year,
//! the number of row slots per month, backup settings, and the optional remote record service.

use crate::backup::Backup;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "ledger.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to the other files that live in the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    ledger_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `.backups` subdirectory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/expenses`
    /// - `year` - The calendar year the ledger tracks.
    /// - `rows_per_month` - How many row slots each month starts with.
    /// - `remote_url` - Base URL of the remote record service, if one is used.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists, if an argument is invalid, or if any
    ///   file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        year: i32,
        rows_per_month: usize,
        remote_url: Option<&str>,
    ) -> Result<Self> {
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            year,
            rows_per_month,
            backup_copies: BACKUP_COPIES,
            remote_url: remote_url.map(str::to_string),
        };
        config_file.validate()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The home directory is already initialized, found '{}'",
                config_path.display()
            )
        }

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        config_file.save(&config_path).await?;

        Ok(Self {
            ledger_path: root.join(LEDGER_JSON),
            root,
            backups: backups_dir,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home directory is missing, run 'expenses init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            ledger_path: root.join(LEDGER_JSON),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where the ledger snapshot lives, `$EXPENSES_HOME/ledger.json`.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn year(&self) -> i32 {
        self.config_file.year
    }

    pub fn rows_per_month(&self) -> usize {
        self.config_file.rows_per_month
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The remote record service, if configured.
    pub fn remote_url(&self) -> Option<Url> {
        // Validated when the file was created or loaded.
        self.config_file
            .remote_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "year": 2024,
///   "rows_per_month": 25,
///   "backup_copies": 5,
///   "remote_url": "https://expenses.example.com/api"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The year being tracked
    year: i32,

    /// Number of row slots each month starts with
    #[serde(default = "default_rows_per_month")]
    rows_per_month: usize,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Base URL of the remote record service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_url: Option<String>,
}

fn default_rows_per_month() -> usize {
    crate::model::DEFAULT_ROWS_PER_MONTH
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Arguments
    /// * `path` - Path to the config.json file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config
            .validate()
            .with_context(|| format!("Invalid config file at {}", path.display()))?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.rows_per_month > 0, "rows_per_month must be at least 1");
        if let Some(url) = &self.remote_url {
            let parsed = Url::parse(url).with_context(|| format!("Invalid remote_url '{url}'"))?;
            ensure!(
                matches!(parsed.scheme(), "http" | "https"),
                "The remote_url must be http or https, got '{url}'"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file(remote_url: Option<&str>) -> ConfigFile {
        ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            year: 2024,
            rows_per_month: 25,
            backup_copies: 5,
            remote_url: remote_url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");

        let config = Config::create(&home_dir, 2024, 30, Some("https://example.com/api"))
            .await
            .unwrap();

        assert_eq!(config.year(), 2024);
        assert_eq!(config.rows_per_month(), 30);
        assert_eq!(config.backup_copies(), 5);
        assert_eq!(
            config.remote_url().unwrap().as_str(),
            "https://example.com/api"
        );
        assert!(config.backups().is_dir());
        assert!(config.config_path().is_file());
        assert!(config.ledger_path().ends_with("ledger.json"));
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), 2023, 25, None).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(created.root(), loaded.root());
        assert!(loaded.remote_url().is_none());
    }

    #[tokio::test]
    async fn test_config_create_refuses_existing_home() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), 2024, 25, None).await.unwrap();
        let err = Config::create(dir.path(), 2024, 25, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_settings() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path().join("a"), 2024, 0, None)
            .await
            .is_err());
        assert!(Config::create(dir.path().join("b"), 2024, 25, Some("not a url"))
            .await
            .is_err());
        assert!(
            Config::create(dir.path().join("c"), 2024, 25, Some("ftp://example.com"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nothing")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = config_file(Some("http://localhost:8001"));
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "expenses",
            "config_version": 1,
            "year": 2025
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.year, 2025);
        assert_eq!(config.rows_per_month, 25);
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.remote_url, None);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "year": 2025
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&config_file(None)).unwrap();
        assert!(!json.contains("remote_url"));
    }
}

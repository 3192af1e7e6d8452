//! Rotating JSON backups of the ledger, taken before it is replaced wholesale.

use crate::model::Ledger;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for backups taken before `import` replaces the ledger.
pub const IMPORT: &str = "import";

/// Prefix for backups taken before `pull` overwrites months with remote data.
pub const PULL: &str = "pull";

const EXTENSION: &str = "json";

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

    pub fn dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Saves the ledger as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files per prefix.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, ledger: &Ledger) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{EXTENSION}");
        let path = self.backups_dir.join(&filename);

        let json =
            serde_json::to_string_pretty(ledger).context("Failed to serialize ledger to JSON")?;
        utils::write(&path, json).await?;
        debug!("Backed up the ledger to {}", path.display());

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Lists the backup files for `prefix`, oldest first.
    pub async fn list(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sorting by name sorts by date and then sequence number.
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files.into_iter().map(|(path, _)| path).collect())
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for path in self.list(prefix).await? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Deletes the oldest backups with the given prefix until `backup_copies` remain.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let files = self.list(prefix).await?;
        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for path in files.into_iter().take(to_delete) {
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

/// Parses the sequence number from a backup filename of the form `{prefix}.{date}-{NNN}.json`.
/// Returns None if the filename doesn't match.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{prefix}.{date}-");
    let remainder = filename.strip_prefix(&expected_start)?;
    let seq_str = remainder.strip_suffix(&format!(".{EXTENSION}"))?;
    seq_str.parse().ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("import.2025-12-14-001.json", "import", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("pull.2025-12-14-042.json", "pull", "2025-12-14"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("pull.2025-12-14-001.json", "import", "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("import.2025-12-13-001.json", "import", "2025-12-14"),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number("import.2025-12-14-001.csv", "import", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("import.2025-12-14-001.json", "import"));
        assert!(is_backup_file("pull.2025-12-14-001.json", "pull"));
        assert!(!is_backup_file("import.2025-12-14-001.json", "pull"));
        assert!(!is_backup_file("importer.2025-12-14-001.json", "import"));
    }

    #[tokio::test]
    async fn test_save_json_sequences_and_rotates() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let ledger = Ledger::sample(25).unwrap();

        let first = backup.save_json(IMPORT, &ledger).await.unwrap();
        let second = backup.save_json(IMPORT, &ledger).await.unwrap();
        let name = |p: &PathBuf| p.file_name().unwrap().to_string_lossy().to_string();
        assert!(name(&first).ends_with("-001.json"));
        assert!(name(&second).ends_with("-002.json"));

        let restored: Ledger = utils::deserialize(&first).await.unwrap();
        assert_eq!(restored, ledger);

        for _ in 0..6 {
            backup.save_json(IMPORT, &ledger).await.unwrap();
        }
        backup.save_json(PULL, &ledger).await.unwrap();

        let imports = backup.list(IMPORT).await.unwrap();
        assert_eq!(imports.len(), 5);
        assert!(name(&imports[4]).ends_with("-008.json"));
        assert_eq!(backup.list(PULL).await.unwrap().len(), 1);
    }
}

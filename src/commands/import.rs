use crate::backup::IMPORT;
use crate::commands::{open_store, Out};
use crate::persist::read_ledger;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Replaces the whole ledger with the ledger JSON in `file`.
///
/// The current ledger is backed up first. A file that is malformed, misses a month, or numbers
/// its rows out of sequence is rejected and the current ledger stays as it is.
pub async fn import(config: Config, file: &Path) -> Result<Out<()>> {
    let incoming = read_ledger(file)
        .await
        .with_context(|| format!("Unable to import {}", file.display()))?;

    let (ledger_file, mut store) = open_store(&config).await;
    let backup_path = config.backup().save_json(IMPORT, store.ledger()).await?;
    debug!("Saved backup to {}", backup_path.display());

    store.restore(incoming)?;
    ledger_file.save(store.ledger()).await?;

    Ok(format!(
        "Imported {} active rows from {}",
        store.ledger().active_row_count(),
        file.display()
    )
    .into())
}

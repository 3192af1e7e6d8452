use crate::commands::Out;
use crate::export::{export_ledger, export_month, write_workbook, ExportFormat};
use crate::model::Month;
use crate::persist::LedgerFile;
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Exports `month`, or the whole year with its annual summary when `month` is `None`, and writes
/// it to `out`.
///
/// # Errors
/// - Returns an error if the output cannot be written. Nothing in the home directory changes.
pub async fn export(
    config: Config,
    month: Option<Month>,
    format: ExportFormat,
    out: &Path,
) -> Result<Out<Vec<PathBuf>>> {
    let ledger = LedgerFile::new(&config).load_or_default().await;
    let workbook = match month {
        Some(month) => export_month(&ledger, month),
        None => export_ledger(&ledger),
    };
    let written = write_workbook(&workbook, out, format)
        .await
        .with_context(|| format!("Unable to export to {}", out.display()))?;

    let what = match month {
        Some(month) => month.to_string(),
        None => format!("{}", config.year()),
    };
    Ok(Out::new(
        format!(
            "Exported {what} as {format} to {} ({} sheets)",
            out.display(),
            workbook.sheets().len()
        ),
        written,
    ))
}

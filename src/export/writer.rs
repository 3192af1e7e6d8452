//! Writes a `Workbook` to disk.

use crate::export::{Sheet, Workbook};
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How an exported workbook is written.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One CSV file per sheet inside the output directory.
    #[default]
    Csv,
    /// The whole workbook as a single JSON document.
    Json,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

/// Writes `workbook` to `out` and returns the paths of the files written.
///
/// # Arguments
/// - `out` - For `ExportFormat::Csv` a directory, created if missing, that receives one file per
///   sheet, e.g. `jan.csv` or `annual_summary.csv`. For `ExportFormat::Json` the file to write.
///
/// # Errors
/// - Returns an error if a directory cannot be created or a file cannot be written.
pub async fn write_workbook(
    workbook: &Workbook,
    out: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    match format {
        ExportFormat::Csv => {
            utils::make_dir(out).await?;
            let mut written = Vec::with_capacity(workbook.sheets().len());
            for sheet in workbook.sheets() {
                let path = out.join(format!("{}.csv", file_stem(sheet.name())));
                utils::write(&path, sheet_to_csv(sheet)?).await?;
                debug!("Wrote sheet '{}' to {}", sheet.name(), path.display());
                written.push(path);
            }
            Ok(written)
        }
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(workbook)
                .context("Unable to serialize the workbook")?;
            utils::write(out, json).await?;
            Ok(vec![out.to_path_buf()])
        }
    }
}

/// Renders a sheet as CSV. Every row is padded to the sheet's width.
fn sheet_to_csv(sheet: &Sheet) -> Result<Vec<u8>> {
    let width = sheet.width();
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in sheet.rows() {
        let mut record: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        record.resize(width, String::new());
        csv.write_record(&record)
            .with_context(|| format!("Unable to write sheet '{}' as CSV", sheet.name()))?;
    }
    csv.into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV for sheet '{}': {e}", sheet.name()))
}

/// `Annual Summary` -> `annual_summary`.
fn file_stem(sheet_name: &str) -> String {
    sheet_name.trim().to_lowercase().replace(' ', "_")
}

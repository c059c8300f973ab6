//! Export of [`ResolvedTable`]s to CSV, JSON and XLSX.
//!
//! Spreadsheet export never fails on its own: when a workbook cannot be
//! produced the CSV rendering is returned instead, which
//! [`ExportFormat::sniff`] reports.

#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod text;
pub mod workbook;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use dhis_model::ResolvedTable;
use tracing::{debug, warn};

pub use error::ExportError;
pub use format::{ExportFormat, MAX_FILENAME_CHARS, clean_filename, file_name};
pub use text::{to_csv, to_json};
pub use workbook::{
    FALLBACK_SHEET, MAX_SHEET_NAME_CHARS, SUMMARY_SHEET, sheet_name, sheet_names, summary_table,
};

/// Serialize one table.
pub fn export(table: &ResolvedTable, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    debug!(table = table.name(), rows = table.row_count(), %format, "export");
    match format {
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Json => to_json(table),
        ExportFormat::Xlsx => match workbook::single_sheet(table) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                warn!(table = table.name(), error = %err, "spreadsheet export failed, using CSV");
                to_csv(table)
            }
        },
    }
}

/// One workbook with a [`SUMMARY_SHEET`] followed by a sheet per table.
///
/// Sheet names are cleaned with [`sheet_names`]: equal names get numbered
/// suffixes, but names that only collide after truncation make the
/// workbook fail and the summary is returned as CSV.
pub fn export_workbook(
    tables: &[ResolvedTable],
    exported_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let summary = summary_table(tables, exported_at);
    debug!(tables = tables.len(), "multi-table export");
    match workbook::with_summary(&summary, tables) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            warn!(error = %err, "workbook export failed, using summary CSV");
            to_csv(&summary)
        }
    }
}

/// Write `bytes` as `dir/{clean name}.{extension}` and return the path.
///
/// The extension follows the bytes, so a spreadsheet that fell back to CSV
/// is written as `.csv`.
pub fn write_export(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name(name, ExportFormat::sniff(bytes)));
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(path)
}

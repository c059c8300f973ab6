//! Export failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serializing or writing an export.
///
/// Spreadsheet failures never show up here: they fall back to CSV.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("Erreur CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erreur JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erreur d'écriture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Impossible d'écrire {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

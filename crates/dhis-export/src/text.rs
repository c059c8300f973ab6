//! CSV and JSON bodies.

use dhis_model::ResolvedTable;

use crate::error::ExportError;

/// Header row then one record per row, UTF-8 with standard quoting.
///
/// A table without columns gives an empty body.
pub fn to_csv(table: &ResolvedTable) -> Result<Vec<u8>, ExportError> {
    if table.column_count() == 0 {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Array of row objects, keys in column order.
pub fn to_json(table: &ResolvedTable) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec(&table.records())?)
}

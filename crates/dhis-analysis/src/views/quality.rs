//! Completeness and duplication checks.

use std::collections::HashSet;

use dhis_model::{CellValue, ColumnKind, ResolvedTable};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingColumn {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityView {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub missing_percentage: f64,
    /// Rows equal to an earlier row.
    pub duplicate_rows: usize,
    pub numeric_columns: usize,
    pub zero_cells: usize,
    /// Columns with at least one missing cell, most missing first.
    pub missing_by_column: Vec<MissingColumn>,
}

/// Cell identity for duplicate detection. Numbers compare by bit pattern
/// with `-0.0` folded into `0.0`.
#[derive(PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Number(u64),
    Text(&'a str),
    DateTime(chrono::NaiveDateTime),
    Missing,
}

impl<'a> From<&'a CellValue> for CellKey<'a> {
    fn from(cell: &'a CellValue) -> Self {
        match cell {
            CellValue::Number(v) if *v == 0.0 => Self::Number(0.0_f64.to_bits()),
            CellValue::Number(v) => Self::Number(v.to_bits()),
            CellValue::Text(text) => Self::Text(text),
            CellValue::DateTime(dt) => Self::DateTime(*dt),
            CellValue::Missing => Self::Missing,
        }
    }
}

pub fn quality(table: &ResolvedTable) -> QualityView {
    let rows = table.row_count();
    let columns = table.column_count();

    let mut missing_by_column: Vec<MissingColumn> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| MissingColumn {
            column: column.name.clone(),
            missing: table.column_values(idx).filter(|c| c.is_missing()).count(),
        })
        .collect();
    let missing_cells = missing_by_column.iter().map(|c| c.missing).sum();
    missing_by_column.retain(|c| c.missing > 0);
    missing_by_column.sort_by(|a, b| b.missing.cmp(&a.missing));

    let cells = rows * columns;
    let missing_percentage = if cells == 0 {
        0.0
    } else {
        missing_cells as f64 / cells as f64 * 100.0
    };

    let mut seen = HashSet::with_capacity(rows);
    let duplicate_rows = table
        .rows()
        .iter()
        .filter(|row| !seen.insert(row.iter().map(CellKey::from).collect::<Vec<_>>()))
        .count();

    let numeric: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.kind == ColumnKind::Numeric)
        .map(|(idx, _)| idx)
        .collect();
    let zero_cells = numeric
        .iter()
        .map(|idx| {
            table
                .column_values(*idx)
                .filter(|c| c.as_f64() == Some(0.0))
                .count()
        })
        .sum();

    QualityView {
        rows,
        columns,
        missing_cells,
        missing_percentage,
        duplicate_rows,
        numeric_columns: numeric.len(),
        zero_cells,
        missing_by_column,
    }
}

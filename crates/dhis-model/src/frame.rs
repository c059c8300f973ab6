//! Conversion of resolved tables into polars data frames.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

use crate::table::{CellValue, ColumnKind, ResolvedTable};

impl ResolvedTable {
    /// Build a polars `DataFrame` with one column per table column.
    ///
    /// Numeric columns become `Float64`; text and datetime columns become
    /// strings in their display form. Missing cells are nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let name = column.name.as_str();
                let series = match column.kind {
                    ColumnKind::Numeric => {
                        let values: Vec<Option<f64>> =
                            self.column_values(idx).map(CellValue::as_f64).collect();
                        Series::new(name.into(), values)
                    }
                    ColumnKind::Text | ColumnKind::DateTime => {
                        let values: Vec<Option<String>> = self
                            .column_values(idx)
                            .map(|cell| (!cell.is_missing()).then(|| cell.to_string()))
                            .collect();
                        Series::new(name.into(), values)
                    }
                };
                series.into_column()
            })
            .collect();
        DataFrame::new(columns)
    }
}

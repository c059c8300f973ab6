//! Column and row filters applied to a table before it is analysed.
//!
//! A [`TableFilter`] keeps the rows matching every [`RowFilter`], then
//! projects the requested columns. Row filters may name columns that the
//! projection drops.

use thiserror::Error;

use crate::table::{CellValue, ColumnKind, ResolvedTable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FilterError {
    #[error("colonne inconnue: {0}")]
    UnknownColumn(String),

    #[error("filtre invalide `{0}` (attendu COLONNE=VALEUR[,VALEUR...])")]
    InvalidValues(String),

    #[error("plage invalide `{0}` (attendu COLONNE=MIN..MAX)")]
    InvalidRange(String),

    #[error("la colonne {0} n'est pas numérique")]
    NotNumeric(String),
}

/// One condition on the cells of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    /// The cell, as displayed, is one of `values`.
    OneOf { column: String, values: Vec<String> },
    /// The cell is a number within `min..=max`. Missing cells never match.
    Range { column: String, min: f64, max: f64 },
}

impl RowFilter {
    pub fn column(&self) -> &str {
        match self {
            Self::OneOf { column, .. } | Self::Range { column, .. } => column,
        }
    }

    /// Parse `COLUMN=VALUE[,VALUE...]`.
    pub fn parse_one_of(arg: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidValues(arg.to_string());
        let (column, values) = split_arg(arg).ok_or_else(invalid)?;
        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            return Err(invalid());
        }
        Ok(Self::OneOf { column, values })
    }

    /// Parse `COLUMN=MIN..MAX`. One bound may be left out: `Cas=10..`.
    pub fn parse_range(arg: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidRange(arg.to_string());
        let (column, range) = split_arg(arg).ok_or_else(invalid)?;
        let (min, max) = range.split_once("..").ok_or_else(invalid)?;
        let (min, max) = (min.trim(), max.trim());
        if min.is_empty() && max.is_empty() {
            return Err(invalid());
        }
        let bound = |text: &str, open: f64| {
            if text.is_empty() {
                Some(open)
            } else {
                text.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        };
        let min = bound(min, f64::NEG_INFINITY).ok_or_else(invalid)?;
        let max = bound(max, f64::INFINITY).ok_or_else(invalid)?;
        if min > max {
            return Err(invalid());
        }
        Ok(Self::Range { column, min, max })
    }

    fn bind<'a>(&'a self, table: &ResolvedTable) -> Result<Condition<'a>, FilterError> {
        let column = self.column();
        let index = table
            .column_index(column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        match self {
            Self::OneOf { values, .. } => Ok(Condition::OneOf { index, values }),
            Self::Range { min, max, .. } => {
                if table.columns()[index].kind != ColumnKind::Numeric {
                    return Err(FilterError::NotNumeric(column.to_string()));
                }
                Ok(Condition::Range {
                    index,
                    min: *min,
                    max: *max,
                })
            }
        }
    }
}

/// `COLUMN=REST` with a non-blank column.
fn split_arg(arg: &str) -> Option<(String, &str)> {
    let (column, rest) = arg.split_once('=')?;
    let column = column.trim();
    (!column.is_empty()).then(|| (column.to_string(), rest))
}

enum Condition<'a> {
    OneOf { index: usize, values: &'a [String] },
    Range { index: usize, min: f64, max: f64 },
}

impl Condition<'_> {
    fn matches(&self, row: &[CellValue]) -> bool {
        match self {
            Self::OneOf { index, values } => {
                let cell = row[*index].to_string();
                values.contains(&cell)
            }
            Self::Range { index, min, max } => row[*index]
                .as_f64()
                .is_some_and(|value| (*min..=*max).contains(&value)),
        }
    }
}

/// Columns to keep and conditions rows must meet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFilter {
    /// Columns kept, in this order. Empty keeps them all.
    pub columns: Vec<String>,
    /// A row is kept when every filter matches.
    pub rows: Vec<RowFilter>,
}

impl TableFilter {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Filtered copy of `table`. Unknown columns are an error.
    pub fn apply(&self, table: &ResolvedTable) -> Result<ResolvedTable, FilterError> {
        let conditions = self
            .rows
            .iter()
            .map(|filter| filter.bind(table))
            .collect::<Result<Vec<_>, _>>()?;
        let columns = if self.columns.is_empty() {
            (0..table.column_count()).collect()
        } else {
            self.columns
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| FilterError::UnknownColumn(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(table.select(&columns, |row| {
            conditions.iter().all(|condition| condition.matches(row))
        }))
    }
}

//! The normalized tabular contract every dashboard item resolves to.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Convert a JSON scalar from an API response into a cell.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Number(number) => number.as_f64().map_or(Self::Missing, Self::Number),
            Value::String(text) => Self::Text(text.clone()),
            Value::Bool(flag) => Self::Text(flag.to_string()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_numeric(*value)),
            Self::Text(value) => f.write_str(value),
            Self::DateTime(value) => f.write_str(&format_datetime(*value)),
            Self::Missing => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(value) if value.is_finite() => serializer.serialize_f64(*value),
            Self::Number(_) | Self::Missing => serializer.serialize_none(),
            Self::Text(value) => serializer.serialize_str(value),
            Self::DateTime(value) => serializer.serialize_str(&format_datetime(*value)),
        }
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// ```
/// use dhis_model::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Date-only rendering at midnight, full timestamp otherwise.
pub fn format_datetime(value: NaiveDateTime) -> String {
    if value.time().num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Declared scalar kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    DateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered columns plus rows of exactly that width.
///
/// Column names are unique and every row holds one cell per column; both
/// hold by construction since rows are only added through [`push_row`].
///
/// [`push_row`]: ResolvedTable::push_row
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

/// Default display name for tables the caller did not name.
pub const DEFAULT_TABLE_NAME: &str = "Données";

impl Default for ResolvedTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl ResolvedTable {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            name: DEFAULT_TABLE_NAME.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Create a table with the given headers (de-duplicated) and no rows.
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = dedupe_column_names(headers.into_iter().map(Into::into));
        Self {
            name: name.into(),
            columns: names
                .into_iter()
                .map(|name| Column {
                    name,
                    kind: ColumnKind::Text,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from headers and rows, then infer column kinds.
    pub fn from_rows<I, S>(name: impl Into<String>, headers: I, rows: Vec<Vec<CellValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(name, headers);
        for row in rows {
            table.push_row(row);
        }
        table.infer_kinds();
        table
    }

    /// A table with the columns at `columns`, in that order, and the rows
    /// `keep` accepts. Column kinds are carried over; out-of-range and
    /// repeated indices are skipped.
    pub fn select<F>(&self, columns: &[usize], mut keep: F) -> Self
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let mut seen = HashSet::new();
        let columns: Vec<usize> = columns
            .iter()
            .copied()
            .filter(|idx| *idx < self.columns.len() && seen.insert(*idx))
            .collect();
        Self {
            name: self.name.clone(),
            columns: columns.iter().map(|idx| self.columns[*idx].clone()).collect(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .map(|row| columns.iter().map(|idx| row[*idx].clone()).collect())
                .collect(),
        }
    }

    /// Append a row, padding with missing cells or dropping extras so the
    /// row matches the header width.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(cells);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Cells of one column in row order.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// One row as `(column name, cell)` pairs in column order.
    pub fn record(&self, row: usize) -> Option<Vec<(&str, &CellValue)>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(|column| column.name.as_str())
                .zip(cells.iter())
                .collect(),
        )
    }

    /// Serializable view of the rows as an array of records.
    pub fn records(&self) -> Records<'_> {
        Records(self)
    }

    /// Recompute every column's kind from its cells.
    ///
    /// A column is numeric (or datetime) when all of its non-missing cells
    /// are; anything else, including an all-missing column, is text.
    pub fn infer_kinds(&mut self) {
        for idx in 0..self.columns.len() {
            let mut numbers = 0usize;
            let mut dates = 0usize;
            let mut present = 0usize;
            for row in &self.rows {
                match &row[idx] {
                    CellValue::Missing => {}
                    CellValue::Number(_) => {
                        numbers += 1;
                        present += 1;
                    }
                    CellValue::DateTime(_) => {
                        dates += 1;
                        present += 1;
                    }
                    CellValue::Text(_) => present += 1,
                }
            }
            self.columns[idx].kind = if present > 0 && numbers == present {
                ColumnKind::Numeric
            } else if present > 0 && dates == present {
                ColumnKind::DateTime
            } else {
                ColumnKind::Text
            };
        }
    }

    /// Convert text columns to numbers where every present cell parses.
    ///
    /// Blank strings become missing cells in a converted column. A column
    /// with any non-numeric text is left untouched. Returns the number of
    /// columns converted.
    pub fn coerce_numeric(&mut self) -> usize {
        let mut converted = 0usize;
        for idx in 0..self.columns.len() {
            if self.columns[idx].kind == ColumnKind::Numeric {
                continue;
            }
            let mut parsed_any = false;
            let coercible = self.rows.iter().all(|row| match &row[idx] {
                CellValue::Missing => true,
                CellValue::Number(_) => {
                    parsed_any = true;
                    true
                }
                CellValue::Text(text) if text.trim().is_empty() => true,
                CellValue::Text(text) => {
                    let ok = parse_number(text).is_some();
                    parsed_any |= ok;
                    ok
                }
                CellValue::DateTime(_) => false,
            });
            if !coercible || !parsed_any {
                continue;
            }
            for row in &mut self.rows {
                let replacement = match &row[idx] {
                    CellValue::Text(text) => {
                        parse_number(text).map_or(CellValue::Missing, CellValue::Number)
                    }
                    _ => continue,
                };
                row[idx] = replacement;
            }
            self.columns[idx].kind = ColumnKind::Numeric;
            converted += 1;
        }
        converted
    }

    /// Replace text cells with a looked-up display value.
    pub fn map_text_cells<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if let CellValue::Text(text) = cell
                    && let Some(replacement) = lookup(text)
                {
                    *text = replacement;
                }
            }
        }
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// De-duplicate column names by suffixing `_1`, `_2`, … on collision.
pub fn dedupe_column_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if seen.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{name}_{suffix}");
            if seen.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
            suffix += 1;
        }
    }
    out
}

/// Rows of a [`ResolvedTable`] serialized as `[{column: value, ...}, ...]`
/// with keys in column order.
pub struct Records<'a>(&'a ResolvedTable);

struct Record<'a> {
    columns: &'a [Column],
    cells: &'a [CellValue],
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.rows.len()))?;
        for cells in &table.rows {
            seq.serialize_element(&Record {
                columns: &table.columns,
                cells,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(&column.name, cell)?;
        }
        map.end()
    }
}

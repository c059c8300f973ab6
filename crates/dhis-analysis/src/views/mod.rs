//! Analysis views over a [`ResolvedTable`].
//!
//! Each view takes the table plus its options and returns either a
//! serializable result or the [`RenderPrecondition`] that prevented it.

use std::collections::BTreeMap;

use dhis_model::{CellValue, ResolvedTable};
use serde::Serialize;

use crate::classify::{Classification, ColumnProfile};
use crate::error::{RenderPrecondition, Result};
use crate::stats;

pub mod comparative;
pub mod descriptive;
pub mod geographic;
pub mod performance;
pub mod predictive;
pub mod quality;
pub mod temporal;

/// Pick `requested` among `candidates`, or the first candidate.
pub(crate) fn choose<'a>(
    classification: &Classification,
    candidates: &[&'a ColumnProfile],
    requested: Option<&str>,
    none: RenderPrecondition,
    expected: &'static str,
) -> Result<&'a ColumnProfile> {
    let Some(first) = candidates.first() else {
        return Err(none);
    };
    let Some(name) = requested else {
        return Ok(*first);
    };
    if let Some(column) = candidates.iter().find(|column| column.name == name) {
        return Ok(*column);
    }
    if classification.get(name).is_some() {
        Err(RenderPrecondition::UnsuitableColumn {
            column: name.to_string(),
            expected,
        })
    } else {
        Err(RenderPrecondition::UnknownColumn(name.to_string()))
    }
}

/// Present numeric values of column `index`.
pub(crate) fn numeric_values(table: &ResolvedTable, index: usize) -> Vec<f64> {
    table
        .column_values(index)
        .filter_map(CellValue::as_f64)
        .collect()
}

/// Values of `value_index` grouped by the display text of `key_index`,
/// ordered by key. Rows with a missing key are dropped; a group whose
/// values are all missing is kept with no values.
pub(crate) fn group_by(
    table: &ResolvedTable,
    key_index: usize,
    value_index: usize,
) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        let key = &row[key_index];
        if key.is_missing() {
            continue;
        }
        let values = groups.entry(key.to_string()).or_default();
        if let Some(value) = row[value_index].as_f64() {
            values.push(value);
        }
    }
    groups
}

/// Aggregates of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupStats {
    pub fn of(key: String, values: &[f64]) -> Self {
        Self {
            key,
            count: values.len(),
            sum: values.iter().sum(),
            mean: stats::mean(values),
            std: stats::sample_std(values),
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
        }
    }
}

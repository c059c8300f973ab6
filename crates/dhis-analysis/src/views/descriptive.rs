//! Overview numbers, one numeric distribution and one frequency table.

use std::cmp::Reverse;
use std::collections::HashMap;

use dhis_model::ResolvedTable;
use serde::Serialize;

use super::{choose, numeric_values};
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};
use crate::stats::{self, Bin, Summary};

pub const HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveOptions {
    /// Column for the distribution; defaults to the first numeric column.
    pub numeric_column: Option<String>,
    /// Column for the frequency table; defaults to the first categorical column.
    pub categorical_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveView {
    pub rows: usize,
    pub columns: usize,
    /// Mean of the per-column means of the numeric columns.
    pub mean_of_means: Option<f64>,
    /// Median of the per-column medians.
    pub median_of_medians: Option<f64>,
    /// Mean of the per-column sample standard deviations.
    pub mean_std: Option<f64>,
    pub missing: usize,
    pub cells: usize,
    pub distribution: Option<Distribution>,
    pub frequencies: Option<Frequencies>,
}

impl DescriptiveView {
    /// Missing cells over all cells.
    pub fn missing_ratio(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.missing as f64 / self.cells as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub column: String,
    pub summary: Option<Summary>,
    pub histogram: Vec<Bin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frequencies {
    pub column: String,
    /// Most frequent first; ties keep first-seen order.
    pub counts: Vec<ValueCount>,
}

pub fn descriptive(table: &ResolvedTable, options: &DescriptiveOptions) -> Result<DescriptiveView> {
    if table.row_count() == 0 || table.column_count() == 0 {
        return Err(RenderPrecondition::EmptyTable);
    }
    let classification = Classification::of(table);
    let numeric: Vec<_> = classification.numeric().collect();
    let categorical: Vec<_> = classification.categorical().collect();

    let per_column: Vec<Vec<f64>> = numeric
        .iter()
        .map(|column| numeric_values(table, column.index))
        .collect();
    let means: Vec<f64> = per_column.iter().filter_map(|v| stats::mean(v)).collect();
    let medians: Vec<f64> = per_column.iter().filter_map(|v| stats::median(v)).collect();
    let stds: Vec<f64> = per_column.iter().filter_map(|v| stats::sample_std(v)).collect();

    let missing = table
        .rows()
        .iter()
        .flatten()
        .filter(|cell| cell.is_missing())
        .count();

    let distribution = if numeric.is_empty() {
        None
    } else {
        let column = choose(
            &classification,
            &numeric,
            options.numeric_column.as_deref(),
            RenderPrecondition::NoNumericColumn,
            "numérique",
        )?;
        let values = numeric_values(table, column.index);
        Some(Distribution {
            column: column.name.clone(),
            summary: Summary::of(&values),
            histogram: stats::histogram(&values, HISTOGRAM_BINS),
        })
    };

    let frequencies = if categorical.is_empty() {
        None
    } else {
        let column = choose(
            &classification,
            &categorical,
            options.categorical_column.as_deref(),
            RenderPrecondition::NoCategoricalColumn,
            "catégorielle",
        )?;
        Some(Frequencies {
            column: column.name.clone(),
            counts: value_counts(table, column.index),
        })
    };

    Ok(DescriptiveView {
        rows: table.row_count(),
        columns: table.column_count(),
        mean_of_means: stats::mean(&means),
        median_of_medians: stats::median(&medians),
        mean_std: stats::mean(&stds),
        missing,
        cells: table.row_count() * table.column_count(),
        distribution,
        frequencies,
    })
}

/// Occurrences of each present value of column `index`.
pub fn value_counts(table: &ResolvedTable, index: usize) -> Vec<ValueCount> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();
    for cell in table.column_values(index) {
        if cell.is_missing() {
            continue;
        }
        let value = cell.to_string();
        match positions.get(&value) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(value.clone(), counts.len());
                counts.push(ValueCount { value, count: 1 });
            }
        }
    }
    counts.sort_by_key(|entry| Reverse(entry.count));
    counts
}

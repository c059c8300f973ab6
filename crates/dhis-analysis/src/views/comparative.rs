//! Group comparison of one numeric column across the values of a
//! categorical column.

use dhis_model::ResolvedTable;
use serde::Serialize;

use super::{GroupStats, choose, group_by};
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};
use crate::stats::{self, AnovaResult, Summary};

/// ANOVA is only run above these sizes.
pub const ANOVA_MIN_GROUPS: usize = 3;
pub const ANOVA_MIN_ROWS: usize = 31;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparativeOptions {
    pub category_column: Option<String>,
    pub value_column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl From<Summary> for BoxStats {
    fn from(summary: Summary) -> Self {
        Self {
            min: summary.min,
            q1: summary.q1,
            median: summary.median,
            q3: summary.q3,
            max: summary.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedGroup {
    pub stats: GroupStats,
    /// `None` when the group has no value.
    pub boxplot: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeView {
    pub category_column: String,
    pub value_column: String,
    /// Ordered by group key.
    pub groups: Vec<ComparedGroup>,
    pub anova: Option<AnovaResult>,
}

pub fn comparative(table: &ResolvedTable, options: &ComparativeOptions) -> Result<ComparativeView> {
    let classification = Classification::of(table);
    let categorical: Vec<_> = classification.categorical().collect();
    let category = choose(
        &classification,
        &categorical,
        options.category_column.as_deref(),
        RenderPrecondition::NoCategoricalColumn,
        "catégorielle",
    )?;
    let numeric: Vec<_> = classification.numeric().collect();
    let value = choose(
        &classification,
        &numeric,
        options.value_column.as_deref(),
        RenderPrecondition::NoNumericColumn,
        "numérique",
    )?;

    let grouped = group_by(table, category.index, value.index);
    let anova = if grouped.len() >= ANOVA_MIN_GROUPS && table.row_count() >= ANOVA_MIN_ROWS {
        let samples: Vec<Vec<f64>> = grouped.values().cloned().collect();
        stats::one_way_anova(&samples)
    } else {
        None
    };
    let groups = grouped
        .into_iter()
        .map(|(key, values)| ComparedGroup {
            boxplot: Summary::of(&values).map(BoxStats::from),
            stats: GroupStats::of(key, &values),
        })
        .collect();

    Ok(ComparativeView {
        category_column: category.name.clone(),
        value_column: value.name.clone(),
        groups,
        anova,
    })
}

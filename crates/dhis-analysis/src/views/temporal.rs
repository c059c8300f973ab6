//! Aggregation per period and a linear trend over the period sums.

use std::collections::BTreeMap;

use dhis_model::ResolvedTable;
use serde::Serialize;
use tracing::debug;

use super::choose;
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};
use crate::period::{Period, parse_cell};
use crate::stats;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalOptions {
    pub time_column: Option<String>,
    pub value_column: Option<String>,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    pub period: String,
    pub mean: Option<f64>,
    pub sum: f64,
    pub std: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Upward,
    Downward,
    Stable,
}

impl TrendDirection {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Upward => "Tendance à la hausse",
            Self::Downward => "Tendance à la baisse",
            Self::Stable => "Tendance stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalView {
    pub time_column: String,
    pub value_column: String,
    /// `None` when the time column could not be read as dates and its raw
    /// values were used as categories instead.
    pub period: Option<Period>,
    /// Ordered by period key.
    pub periods: Vec<PeriodAggregate>,
    /// Needs at least two periods.
    pub trend: Option<Trend>,
}

impl TemporalView {
    pub fn is_degraded(&self) -> bool {
        self.period.is_none()
    }
}

pub fn temporal(table: &ResolvedTable, options: &TemporalOptions) -> Result<TemporalView> {
    let classification = Classification::of(table);
    let temporal: Vec<_> = classification.temporal().collect();
    let time = choose(
        &classification,
        &temporal,
        options.time_column.as_deref(),
        RenderPrecondition::NoTemporalColumn,
        "temporelle",
    )?;
    let numeric: Vec<_> = classification
        .numeric()
        .filter(|column| column.index != time.index)
        .collect();
    let value = choose(
        &classification,
        &numeric,
        options.value_column.as_deref(),
        RenderPrecondition::NoNumericColumn,
        "numérique",
    )?;

    let dates: Option<Vec<_>> = table
        .column_values(time.index)
        .filter(|cell| !cell.is_missing())
        .map(parse_cell)
        .collect();
    let period = dates
        .filter(|dates| !dates.is_empty())
        .map(|_| options.period);
    if period.is_none() {
        debug!(column = %time.name, "time column is not parseable, using raw values");
    }

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        let cell = &row[time.index];
        if cell.is_missing() {
            continue;
        }
        let key = match (period, parse_cell(cell)) {
            (Some(period), Some(date)) => period.key(date),
            _ => cell.to_string(),
        };
        let values = groups.entry(key).or_default();
        if let Some(v) = row[value.index].as_f64() {
            values.push(v);
        }
    }

    let periods: Vec<PeriodAggregate> = groups
        .into_iter()
        .map(|(period, values)| PeriodAggregate {
            mean: stats::mean(&values),
            sum: values.iter().sum(),
            std: stats::sample_std(&values),
            count: values.len(),
            period,
        })
        .collect();

    Ok(TemporalView {
        time_column: time.name.clone(),
        value_column: value.name.clone(),
        period,
        trend: trend(&periods),
        periods,
    })
}

fn trend(periods: &[PeriodAggregate]) -> Option<Trend> {
    if periods.len() < 2 {
        return None;
    }
    let x: Vec<f64> = (0..periods.len()).map(|idx| idx as f64).collect();
    let y: Vec<f64> = periods.iter().map(|p| p.sum).collect();
    let fit = stats::linear_regression(&x, &y);
    let direction = if fit.slope > 0.0 {
        TrendDirection::Upward
    } else if fit.slope < 0.0 {
        TrendDirection::Downward
    } else {
        TrendDirection::Stable
    };
    Some(Trend {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared(),
        direction,
    })
}

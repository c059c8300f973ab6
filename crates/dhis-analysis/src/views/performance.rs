//! Indicator banding against low / mid / high thresholds.

use dhis_model::{CellValue, ResolvedTable};
use serde::{Deserialize, Serialize};

use super::{choose, numeric_values};
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};
use crate::stats::{self, Summary};

pub const SAMPLE_ROWS: usize = 20;

const THRESHOLD_LABELS: [&str; 4] = ["Faible", "Moyenne", "Bonne", "Excellente"];
const QUARTILE_LABELS: [&str; 4] = ["Très faible", "Faible", "Moyen", "Élevé"];

/// Integer thresholds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low: i32,
    pub mid: i32,
    pub high: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 70,
            mid: 85,
            high: 95,
        }
    }
}

impl Thresholds {
    pub const fn new(low: i32, mid: i32, high: i32) -> Self {
        Self { low, mid, high }
    }

    /// Nearest triple with `low < mid < high` after bringing each value into
    /// `0..=100`. A valid triple is returned as is.
    pub fn clamped(self) -> Self {
        let [low, mid, high] = [self.low, self.mid, self.high].map(|v| v.clamp(0, 100));
        let low = low.min(mid - 1);
        let mid = mid.min(high - 1).max(low + 1);
        let high = high.max(mid + 1);
        Self { low, mid, high }
    }

    /// Whether `[0, low, mid, high, 100]` is strictly increasing.
    pub fn is_valid_binning(&self) -> bool {
        0 < self.low && self.low < self.mid && self.mid < self.high && self.high < 100
    }

    /// Band index of `value`; the first interval includes 0. Values outside
    /// `[0, 100]` have no band.
    fn band(&self, value: f64) -> Option<usize> {
        if !(0.0..=100.0).contains(&value) {
            return None;
        }
        [self.low, self.mid, self.high, 100]
            .iter()
            .position(|edge| value <= f64::from(*edge))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Binning {
    Thresholds { thresholds: Thresholds },
    /// Fallback when the thresholds cannot form increasing bins.
    Quartiles { edges: [f64; 5] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub label: &'static str,
    pub count: usize,
    /// Share of all table rows.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceOptions {
    pub column: Option<String>,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceView {
    pub column: String,
    pub thresholds: Thresholds,
    pub binning: Binning,
    pub bands: Vec<BandCount>,
    /// Values no band covers.
    pub unclassified: usize,
    pub summary: Option<Summary>,
    /// Leading rows of the table, best value first.
    pub sample: Vec<Vec<CellValue>>,
}

pub fn performance(table: &ResolvedTable, options: &PerformanceOptions) -> Result<PerformanceView> {
    let classification = Classification::of(table);
    let candidates = classification.performance_candidates();
    let column = choose(
        &classification,
        &candidates,
        options.column.as_deref(),
        RenderPrecondition::NoPerformanceColumn,
        "de performance",
    )?;
    if table.row_count() == 0 {
        return Err(RenderPrecondition::EmptyTable);
    }

    let values = numeric_values(table, column.index);
    let thresholds = options.thresholds.clamped();
    let (binning, labels, assigned) = if thresholds.is_valid_binning() {
        let assigned: Vec<_> = values.iter().map(|v| thresholds.band(*v)).collect();
        (
            Binning::Thresholds { thresholds },
            THRESHOLD_LABELS,
            assigned,
        )
    } else {
        let edges = quartile_edges(&values);
        let assigned: Vec<_> = values.iter().map(|v| quartile_band(&edges, *v)).collect();
        (Binning::Quartiles { edges }, QUARTILE_LABELS, assigned)
    };

    let mut counts = [0_usize; 4];
    let mut unclassified = 0;
    for band in assigned {
        match band {
            Some(idx) => counts[idx] += 1,
            None => unclassified += 1,
        }
    }
    let rows = table.row_count() as f64;
    let bands = labels
        .into_iter()
        .zip(counts)
        .map(|(label, count)| BandCount {
            label,
            count,
            percentage: count as f64 / rows * 100.0,
        })
        .collect();

    let mut sample: Vec<Vec<CellValue>> = table.rows().iter().take(SAMPLE_ROWS).cloned().collect();
    let index = column.index;
    sample.sort_by(|a, b| match (a[index].as_f64(), b[index].as_f64()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    Ok(PerformanceView {
        column: column.name.clone(),
        thresholds,
        binning,
        bands,
        unclassified,
        summary: Summary::of(&values),
        sample,
    })
}

fn quartile_edges(values: &[f64]) -> [f64; 5] {
    let sorted = stats::sorted(values);
    [0.0, 0.25, 0.5, 0.75, 1.0].map(|q| stats::quantile_sorted(&sorted, q).unwrap_or(0.0))
}

fn quartile_band(edges: &[f64; 5], value: f64) -> Option<usize> {
    if value < edges[0] {
        return None;
    }
    edges[1..].iter().position(|edge| value <= *edge)
}

//! Aggregates per place and the top places by sum.

use dhis_model::ResolvedTable;
use serde::Serialize;

use super::{GroupStats, choose, group_by};
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};

pub const DEFAULT_TOP_N: usize = 10;
pub const MIN_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographicOptions {
    pub region_column: Option<String>,
    pub value_column: Option<String>,
    /// Clamped to `MIN_TOP_N..=MAX_TOP_N`.
    pub top_n: usize,
}

impl Default for GeographicOptions {
    fn default() -> Self {
        Self {
            region_column: None,
            value_column: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicView {
    pub region_column: String,
    pub value_column: String,
    pub top_n: usize,
    /// Every place, largest sum first.
    pub regions: Vec<GroupStats>,
}

impl GeographicView {
    pub fn top(&self) -> &[GroupStats] {
        &self.regions[..self.top_n.min(self.regions.len())]
    }
}

pub fn geographic(table: &ResolvedTable, options: &GeographicOptions) -> Result<GeographicView> {
    let classification = Classification::of(table);
    let places: Vec<_> = classification.geographic().collect();
    let region = choose(
        &classification,
        &places,
        options.region_column.as_deref(),
        RenderPrecondition::NoGeographicColumn,
        "géographique",
    )?;
    let numeric: Vec<_> = classification.numeric().collect();
    let value = choose(
        &classification,
        &numeric,
        options.value_column.as_deref(),
        RenderPrecondition::NoNumericColumn,
        "numérique",
    )?;

    let mut regions: Vec<GroupStats> = group_by(table, region.index, value.index)
        .into_iter()
        .map(|(key, values)| GroupStats::of(key, &values))
        .collect();
    regions.sort_by(|a, b| b.sum.total_cmp(&a.sum));

    Ok(GeographicView {
        region_column: region.name.clone(),
        value_column: value.name.clone(),
        top_n: options.top_n.clamp(MIN_TOP_N, MAX_TOP_N),
        regions,
    })
}

#[cfg(test)]
mod tests {
    use dhis_model::CellValue;

    use super::*;

    fn table(regions: usize) -> ResolvedTable {
        let rows = (0..regions)
            .flat_map(|idx| {
                let name = format!("R{idx:02}");
                [1.0, 2.0].map(|v| vec![CellValue::text(&name), CellValue::Number(v * idx as f64)])
            })
            .collect();
        ResolvedTable::from_rows("t", ["District", "Cas"], rows)
    }

    #[test]
    fn regions_sorted_by_sum() {
        let view = geographic(&table(12), &GeographicOptions::default()).expect("view");
        assert_eq!(view.regions.len(), 12);
        assert_eq!(view.regions[0].key, "R11");
        assert_eq!(view.regions[0].sum, 33.0);
        assert_eq!(view.regions[0].count, 2);
        assert_eq!(view.regions[0].mean, Some(16.5));
        assert_eq!(view.top().len(), 10);
    }

    #[test]
    fn top_n_is_clamped() {
        let few = GeographicOptions {
            top_n: 1,
            ..GeographicOptions::default()
        };
        assert_eq!(geographic(&table(8), &few).expect("view").top_n, 5);
        let many = GeographicOptions {
            top_n: 50,
            ..GeographicOptions::default()
        };
        let view = geographic(&table(8), &many).expect("view");
        assert_eq!(view.top_n, 20);
        assert_eq!(view.top().len(), 8);
    }

    #[test]
    fn needs_a_place_column() {
        let table = ResolvedTable::from_rows(
            "t",
            ["Vaccin", "Doses"],
            vec![vec![CellValue::text("BCG"), CellValue::Number(1.0)]],
        );
        assert_eq!(
            geographic(&table, &GeographicOptions::default()),
            Err(RenderPrecondition::NoGeographicColumn)
        );
    }
}

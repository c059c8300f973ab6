//! Turning a dashboard item into a table.
//!
//! Visualizations and charts walk a fixed chain of sources and stop at the
//! first one that yields rows; the synthetic generator terminates the chain.
//! Every outcome, including failure, is a [`ResolvedItem`].

use dhis_model::{CellValue, ContentRef, DashboardItem, ItemKind, ResolvedTable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::Dhis2Client;
use crate::error::ResolveError;
use crate::parse::{ParsedSeries, parse_series};
use crate::synthetic::REGIONS;
use crate::transport::{Query, Transport};

/// Text items longer than this are cut and suffixed with `...`.
pub const TEXT_PREVIEW_CHARS: usize = 500;

/// Knobs for the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Also try `/api/analytics` before falling back to synthetic data.
    #[serde(default)]
    pub legacy_analytics_fallback: bool,
}

/// The outcome of resolving one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub table: ResolvedTable,
    pub status: String,
    pub kind: ItemKind,
}

/// Which step of the chain produced a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    EventData,
    DataJson,
    Analytics,
    Synthetic,
}

/// A table for a visualization or chart, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub table: ResolvedTable,
    pub status: String,
    pub source: SeriesSource,
}

/// Senegal region centroids for the map placeholder.
const MAP_COORDINATES: [(f64, f64); 10] = [
    (14.7167, -17.4672),
    (14.7833, -16.9167),
    (14.8833, -16.2333),
    (16.0333, -16.5000),
    (14.1500, -16.0833),
    (15.6500, -16.2333),
    (14.3333, -16.4333),
    (14.1167, -15.7000),
    (15.6667, -13.2500),
    (12.5500, -12.1833),
];

impl<T: Transport> Dhis2Client<T> {
    /// Resolve `item` into a table, a status line and a kind. Never fails:
    /// errors become a one-row error table.
    pub fn resolve_item(&self, item: &DashboardItem) -> ResolvedItem {
        let name = item.display_name();
        match self.try_resolve(item, &name) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(item = %name, "item resolution failed: {err}");
                error_item(&err.to_string(), &name)
            }
        }
    }

    fn try_resolve(&self, item: &DashboardItem, name: &str) -> Result<ResolvedItem, ResolveError> {
        match item {
            DashboardItem::Visualization(content) => {
                let Some(id) = content_id(content) else {
                    debug!(item = %name, "visualization without id, using synthetic data");
                    return self.synthetic_item(name);
                };
                let series = self.fetch_series_data(id, name)?;
                let subtype = content.subtype.as_deref().unwrap_or("Visualisation");
                Ok(ResolvedItem {
                    status: format!("{} | Type: {subtype}", series.status),
                    table: series.table,
                    kind: ItemKind::Visualization,
                })
            }
            DashboardItem::Chart(content) => {
                let Some(id) = content_id(content) else {
                    debug!(item = %name, "chart without id, using synthetic data");
                    return self.synthetic_item(name);
                };
                let series = self.fetch_series_data(id, name)?;
                Ok(ResolvedItem {
                    table: series.table,
                    status: series.status,
                    kind: ItemKind::Chart,
                })
            }
            DashboardItem::Map(_) => Ok(ResolvedItem {
                table: map_table(name),
                status: format!("Données cartographiques pour {name}"),
                kind: ItemKind::Map,
            }),
            DashboardItem::Text { content } => Ok(ResolvedItem {
                table: text_table(content),
                status: format!("Élément texte: {name}"),
                kind: ItemKind::Text,
            }),
            DashboardItem::Other { item_type } => {
                debug!(?item_type, "unsupported item type, using synthetic data");
                self.synthetic_item(name)
            }
        }
    }

    fn synthetic_item(&self, name: &str) -> Result<ResolvedItem, ResolveError> {
        let dataset = self.synthetic.generate(name)?;
        Ok(ResolvedItem {
            table: dataset.table.with_name(name),
            status: dataset.status,
            kind: ItemKind::Other,
        })
    }

    /// Fetch the rows behind a visualization or chart.
    ///
    /// Sources are tried in order: `/data` (event output), `/data.json`,
    /// `/api/analytics` when [`ResolverOptions::legacy_analytics_fallback`]
    /// is set, and finally the synthetic generator. Transport failures,
    /// non-200 answers, unparseable bodies and empty results all move on to
    /// the next source. Only a failing generator is an error.
    pub fn fetch_series_data(&self, id: &str, name: &str) -> Result<SeriesData, ResolveError> {
        let mut attempts = vec![
            (
                SeriesSource::EventData,
                format!("/api/visualizations/{id}/data"),
                vec![
                    ("outputType", "EVENT".to_string()),
                    ("skipMeta", "false".to_string()),
                ],
            ),
            (
                SeriesSource::DataJson,
                format!("/api/visualizations/{id}/data.json"),
                vec![
                    ("skipMeta", "false".to_string()),
                    ("skipData", "false".to_string()),
                    ("paging", "false".to_string()),
                ],
            ),
        ];
        if self.options.legacy_analytics_fallback {
            attempts.push((
                SeriesSource::Analytics,
                "/api/analytics".to_string(),
                vec![
                    ("dimension", format!("dx:{id}")),
                    ("dimension", "pe:LAST_12_MONTHS".to_string()),
                    ("filter", "ou:USER_ORGUNIT".to_string()),
                ],
            ));
        }

        for (source, path, query) in attempts {
            if let Some(parsed) = self.try_source(&path, &query, name) {
                debug!(?source, rows = parsed.table.row_count(), "series resolved");
                return Ok(SeriesData {
                    table: parsed.table,
                    status: parsed.status,
                    source,
                });
            }
        }

        warn!(item = %name, "no live data, using synthetic dataset");
        let dataset = self.synthetic.generate(name)?;
        Ok(SeriesData {
            table: dataset.table.with_name(name),
            status: dataset.status,
            source: SeriesSource::Synthetic,
        })
    }

    fn try_source(&self, path: &str, query: &Query, name: &str) -> Option<ParsedSeries> {
        let response = match self.transport.get(path, query) {
            Ok(response) => response,
            Err(err) => {
                warn!(path, "request failed: {err}");
                return None;
            }
        };
        if !response.is_ok() {
            debug!(path, status = response.status, "source unavailable");
            return None;
        }
        match parse_series(&response.body, name) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!(path, "unusable payload: {err}");
                None
            }
        }
    }
}

fn content_id(content: &ContentRef) -> Option<&str> {
    Some(content.id.as_str()).filter(|id| !id.trim().is_empty())
}

/// Ten-region reference table with random values.
fn map_table(name: &str) -> ResolvedTable {
    let mut rng = rand::thread_rng();
    let rows = REGIONS
        .iter()
        .zip(MAP_COORDINATES)
        .map(|(region, (latitude, longitude))| {
            vec![
                CellValue::text(*region),
                CellValue::Number(latitude),
                CellValue::Number(longitude),
                CellValue::Number(f64::from(rng.gen_range(100..1000_i32))),
                CellValue::Number(f64::from(rng.gen_range(50_000..500_000_i32))),
            ]
        })
        .collect();
    ResolvedTable::from_rows(
        name,
        ["Région", "Latitude", "Longitude", "Valeur", "Population"],
        rows,
    )
}

fn text_table(content: &str) -> ResolvedTable {
    let preview = if content.chars().count() > TEXT_PREVIEW_CHARS {
        let cut: String = content.chars().take(TEXT_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    };
    ResolvedTable::from_rows(
        "Texte",
        ["Type", "Contenu"],
        vec![vec![CellValue::text("Texte"), CellValue::text(preview)]],
    )
}

/// One-row `{Erreur, Élément}` table.
pub fn error_item(message: &str, item_name: &str) -> ResolvedItem {
    ResolvedItem {
        table: ResolvedTable::from_rows(
            "Erreur",
            ["Erreur", "Élément"],
            vec![vec![CellValue::text(message), CellValue::text(item_name)]],
        ),
        status: format!("Erreur: {message}"),
        kind: ItemKind::Error,
    }
}

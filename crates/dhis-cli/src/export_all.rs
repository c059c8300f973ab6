//! Tables written by `export-all`.

use dhis_client::{Dhis2Client, Transport};
use dhis_model::{CellValue, Dashboard, ResolvedTable};
use tracing::debug;

/// Sheet holding one line per dashboard item in a full export.
pub const METADATA_TABLE: &str = "Métadonnées";

/// One row per dashboard item: position, name, kind, id, data flag.
pub fn metadata_table(dashboard: &Dashboard) -> ResolvedTable {
    let rows = dashboard
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            vec![
                CellValue::Number((idx + 1) as f64),
                CellValue::text(item.display_name()),
                CellValue::text(item.kind().label()),
                item.content_id().map_or(CellValue::Missing, CellValue::text),
                CellValue::text(if item.has_tabular_data() { "oui" } else { "non" }),
            ]
        })
        .collect();
    ResolvedTable::from_rows(
        METADATA_TABLE,
        ["index", "nom", "type", "id", "has_data"],
        rows,
    )
}

/// The metadata table followed by every non-empty table of the items
/// with tabular data, in dashboard order.
pub fn dashboard_tables<T: Transport>(
    client: &Dhis2Client<T>,
    dashboard: &Dashboard,
) -> Vec<ResolvedTable> {
    let mut tables = vec![metadata_table(dashboard)];
    for item in dashboard.items.iter().filter(|item| item.has_tabular_data()) {
        let resolved = client.resolve_item(item);
        if resolved.table.is_empty() {
            debug!(item = %item.display_name(), "no rows, not exported");
            continue;
        }
        tables.push(resolved.table);
    }
    tables
}

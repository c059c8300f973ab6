mod common;

use dhis_client::{
    Dhis2Client, FetchError, ResolveError, ResolverOptions, SeriesSource, SyntheticDataset,
    SyntheticSource,
};
use dhis_model::{CellValue, ContentRef, DashboardItem, ItemKind};
use serde_json::json;

use common::MemoryTransport;

fn visualization(id: &str, name: &str) -> DashboardItem {
    DashboardItem::Visualization(ContentRef {
        id: id.to_string(),
        name: Some(name.to_string()),
        subtype: Some("PIVOT_TABLE".to_string()),
    })
}

fn rows_body() -> serde_json::Value {
    json!({
        "headers": [{"name": "Période"}, {"name": "Valeur"}],
        "rows": [["202401", "12"], ["202402", "15"]]
    })
}

struct FailingSource;

impl SyntheticSource for FailingSource {
    fn generate(&self, _item_name: &str) -> Result<SyntheticDataset, ResolveError> {
        Err(ResolveError::Generator("générateur indisponible".to_string()))
    }
}

#[test]
fn text_item_needs_no_request() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let resolved = client.resolve_item(&DashboardItem::Text {
        content: "hello".to_string(),
    });

    assert_eq!(resolved.kind, ItemKind::Text);
    assert_eq!(resolved.status, "Élément texte: Texte");
    assert_eq!(resolved.table.row_count(), 1);
    assert_eq!(resolved.table.cell(0, 0), Some(&CellValue::text("Texte")));
    let content = resolved.table.column_index("Contenu").expect("Contenu");
    assert_eq!(resolved.table.cell(0, content), Some(&CellValue::text("hello")));
    assert!(client.transport().requests().is_empty());
}

#[test]
fn event_data_is_tried_first() {
    let transport = MemoryTransport::new().json("/api/visualizations/V1/data", rows_body());
    let client = Dhis2Client::with_transport(transport);

    let resolved = client.resolve_item(&visualization("V1", "CPN1"));
    assert_eq!(resolved.kind, ItemKind::Visualization);
    assert_eq!(resolved.status, "Données récupérées (2 lignes) | Type: PIVOT_TABLE");
    assert_eq!(resolved.table.name(), "CPN1");
    assert_eq!(resolved.table.cell(1, 1), Some(&CellValue::Number(15.0)));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].param("outputType"), Some("EVENT"));
    assert_eq!(requests[0].param("skipMeta"), Some("false"));
}

#[test]
fn data_json_follows_unparseable_event_data() {
    let transport = MemoryTransport::new()
        .route("/api/visualizations/V1/data", |_| {
            Ok(dhis_client::HttpResponse::ok("<html></html>"))
        })
        .json("/api/visualizations/V1/data.json", rows_body());
    let client = Dhis2Client::with_transport(transport);

    let series = client.fetch_series_data("V1", "CPN1").expect("series");
    assert_eq!(series.source, SeriesSource::DataJson);
    assert_eq!(series.table.row_count(), 2);

    let requests = client.transport().requests();
    assert_eq!(requests[1].param("skipData"), Some("false"));
    assert_eq!(requests[1].param("paging"), Some("false"));
}

#[test]
fn chain_ends_in_synthetic_data() {
    let transport = MemoryTransport::new()
        .status("/api/visualizations/V1/data", 500)
        .json(
            "/api/visualizations/V1/data.json",
            json!({"headers": [], "rows": []}),
        );
    let client = Dhis2Client::with_transport(transport);

    let resolved = client.resolve_item(&visualization("V1", "Couverture vaccinale"));
    assert!(resolved.status.starts_with("Données vaccinales pour analyses"));
    assert!(resolved.status.ends_with("| Type: PIVOT_TABLE"));
    assert_eq!(resolved.kind, ItemKind::Visualization);
    assert_eq!(resolved.table.name(), "Couverture vaccinale");
    assert_eq!(
        client.transport().paths(),
        vec![
            "/api/visualizations/V1/data".to_string(),
            "/api/visualizations/V1/data.json".to_string(),
        ]
    );
}

#[test]
fn legacy_analytics_is_opt_in() {
    let transport = MemoryTransport::new()
        .route("/api/visualizations/C1/data", |_| {
            Err(FetchError::Network("timeout".to_string()))
        })
        .json(
            "/api/analytics",
            json!({
                "headers": [{"name": "dx"}, {"name": "pe"}, {"name": "value"}],
                "rows": [["C1", "202401", "4"]],
                "metaData": {"items": {"C1": {"name": "Consultations"}}}
            }),
        );
    let client = Dhis2Client::with_transport(transport).with_options(ResolverOptions {
        legacy_analytics_fallback: true,
    });

    let series = client.fetch_series_data("C1", "Consultations").expect("series");
    assert_eq!(series.source, SeriesSource::Analytics);
    assert_eq!(series.table.cell(0, 0), Some(&CellValue::text("Consultations")));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 3);
    let analytics = &requests[2];
    assert_eq!(analytics.path, "/api/analytics");
    assert_eq!(analytics.params("dimension"), vec!["dx:C1", "pe:LAST_12_MONTHS"]);
    assert_eq!(analytics.param("filter"), Some("ou:USER_ORGUNIT"));
}

#[test]
fn analytics_is_skipped_by_default() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let series = client.fetch_series_data("C1", "Paludisme").expect("series");
    assert_eq!(series.source, SeriesSource::Synthetic);
    assert!(
        !client
            .transport()
            .paths()
            .iter()
            .any(|path| path == "/api/analytics")
    );
}

#[test]
fn chart_status_has_no_type_suffix() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let resolved = client.resolve_item(&DashboardItem::Chart(ContentRef {
        id: "C1".to_string(),
        name: Some("Cas de malaria".to_string()),
        subtype: Some("COLUMN".to_string()),
    }));
    assert_eq!(resolved.kind, ItemKind::Chart);
    assert!(resolved.status.starts_with("Données paludisme"));
    assert!(!resolved.status.contains("Type:"));
}

#[test]
fn missing_identifier_uses_synthetic_data() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let resolved = client.resolve_item(&visualization("", "Sans id"));

    assert_eq!(resolved.kind, ItemKind::Other);
    assert_eq!(resolved.table.name(), "Sans id");
    assert!(!resolved.table.is_empty());
    assert!(resolved.status.starts_with("Données multi-dimensionnelles"));
    assert!(client.transport().requests().is_empty());

    let chart = client.resolve_item(&DashboardItem::Chart(ContentRef {
        id: "  ".to_string(),
        name: Some("Couverture vaccinale".to_string()),
        subtype: None,
    }));
    assert_eq!(chart.kind, ItemKind::Other);
    assert!(chart.status.starts_with("Données vaccinales"));
    assert!(client.transport().requests().is_empty());
}

#[test]
fn failing_generator_becomes_error_table() {
    let client = Dhis2Client::with_transport(MemoryTransport::new()).with_synthetic(FailingSource);
    let resolved = client.resolve_item(&DashboardItem::Other { item_type: None });

    assert_eq!(resolved.kind, ItemKind::Error);
    assert_eq!(
        resolved.table.cell(0, 0),
        Some(&CellValue::text(
            "Erreur génération données: générateur indisponible"
        ))
    );
    assert_eq!(resolved.table.cell(0, 1), Some(&CellValue::text("Élément")));
}

#[test]
fn other_items_use_generic_dataset() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let resolved = client.resolve_item(&DashboardItem::Other {
        item_type: Some("REPORTS".to_string()),
    });
    assert_eq!(resolved.kind, ItemKind::Other);
    assert_eq!(resolved.table.row_count(), 100);
    assert!(resolved.status.starts_with("Données multi-dimensionnelles"));
}

#[test]
fn map_item_is_placeholder_table() {
    let client = Dhis2Client::with_transport(MemoryTransport::new());
    let resolved = client.resolve_item(&DashboardItem::Map(ContentRef {
        id: "M1".to_string(),
        name: Some("Couverture par région".to_string()),
        subtype: None,
    }));
    assert_eq!(resolved.kind, ItemKind::Map);
    assert_eq!(resolved.status, "Données cartographiques pour Couverture par région");
    assert_eq!(
        resolved.table.column_names(),
        vec!["Région", "Latitude", "Longitude", "Valeur", "Population"]
    );
    assert_eq!(resolved.table.row_count(), 10);
    assert!(client.transport().requests().is_empty());
}

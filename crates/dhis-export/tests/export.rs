//! Export bodies, the spreadsheet path and its CSV fallback.

use std::io::Cursor;

use calamine::{Reader, Xlsx, open_workbook_from_rs};
use chrono::{NaiveDate, NaiveDateTime};
use dhis_export::{ExportFormat, SUMMARY_SHEET, export, export_workbook, write_export};
use dhis_model::{CellValue, ResolvedTable};

fn coverage(name: &str) -> ResolvedTable {
    ResolvedTable::from_rows(
        name,
        ["Région", "Cas", "Note"],
        vec![
            vec![CellValue::text("Dakar"), CellValue::Number(12.0), CellValue::Missing],
            vec![
                CellValue::text("Saint-Louis, Nord"),
                CellValue::Number(3.5),
                CellValue::text("dit \"ok\""),
            ],
        ],
    )
}

/// Wider than Excel allows, so no workbook can hold it.
fn too_wide() -> ResolvedTable {
    let headers: Vec<String> = (0..=16_384).map(|i| format!("c{i}")).collect();
    let row = vec![CellValue::Number(1.0); headers.len()];
    ResolvedTable::from_rows("Large", headers, vec![row])
}

fn error_table() -> ResolvedTable {
    ResolvedTable::from_rows(
        "Erreur",
        ["Erreur", "Élément"],
        vec![vec![CellValue::text("identifiant manquant"), CellValue::text("CPN")]],
    )
}

fn exported_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(8, 30, 0))
        .expect("datetime")
}

fn sheets(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(bytes)).expect("valid workbook")
}

fn sheet_rows(workbook: &mut Xlsx<Cursor<Vec<u8>>>, name: &str) -> Vec<Vec<String>> {
    workbook
        .worksheet_range(name)
        .expect("sheet")
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}

fn csv_records(bytes: &[u8]) -> (Vec<String>, usize) {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader.records().map(|r| r.expect("record")).count();
    (headers, rows)
}

#[test]
fn csv_body() {
    let bytes = export(&coverage("Couverture"), ExportFormat::Csv).expect("csv");
    let body = String::from_utf8(bytes).expect("utf-8");
    insta::assert_snapshot!(body.trim_end(), @r#"
    Région,Cas,Note
    Dakar,12,
    "Saint-Louis, Nord",3.5,"dit ""ok"""
    "#);
}

#[test]
fn json_records_keep_column_order() {
    let bytes = export(&coverage("Couverture"), ExportFormat::Json).expect("json");
    let body = String::from_utf8(bytes).expect("utf-8");
    insta::assert_snapshot!(body, @r#"[{"Région":"Dakar","Cas":12.0,"Note":null},{"Région":"Saint-Louis, Nord","Cas":3.5,"Note":"dit \"ok\""}]"#);
}

#[test]
fn empty_tables_export_without_error() {
    let bytes = export(&ResolvedTable::new("Vide", ["a", "b"]), ExportFormat::Csv).expect("csv");
    assert_eq!(bytes, b"a,b\n");
    let bytes = export(&ResolvedTable::empty(), ExportFormat::Csv).expect("csv");
    assert!(bytes.is_empty());
    let bytes = export(&ResolvedTable::empty(), ExportFormat::Json).expect("json");
    assert_eq!(bytes, b"[]");
}

#[test]
fn spreadsheet_has_one_sheet_named_for_the_table() {
    let bytes = export(&coverage("Couverture"), ExportFormat::Xlsx).expect("xlsx");
    assert_eq!(ExportFormat::sniff(&bytes), ExportFormat::Xlsx);
    let mut workbook = sheets(bytes);
    assert_eq!(workbook.sheet_names(), ["Couverture"]);
    assert_eq!(
        sheet_rows(&mut workbook, "Couverture"),
        [
            ["Région", "Cas", "Note"],
            ["Dakar", "12", ""],
            ["Saint-Louis, Nord", "3.5", "dit \"ok\""],
        ]
    );
}

#[test]
fn long_sheet_names_are_truncated() {
    let name = "Couverture vaccinale Penta3 par district sanitaire";
    let bytes = export(&coverage(name), ExportFormat::Xlsx).expect("xlsx");
    let workbook = sheets(bytes);
    let names = workbook.sheet_names();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].chars().count(), 31);
    assert!(name.starts_with(names[0].as_str()));
}

#[test]
fn names_excel_rejects_are_cleaned() {
    let bytes = export(&coverage("ANC / couverture"), ExportFormat::Xlsx).expect("xlsx");
    assert_eq!(ExportFormat::sniff(&bytes), ExportFormat::Xlsx);
    let workbook = sheets(bytes);
    assert_eq!(workbook.sheet_names(), ["ANC _ couverture"]);
}

#[test]
fn failing_spreadsheet_falls_back_to_csv() {
    let bytes = export(&too_wide(), ExportFormat::Xlsx).expect("fallback");
    assert!(!bytes.is_empty());
    assert_eq!(ExportFormat::sniff(&bytes), ExportFormat::Csv);
    let (headers, rows) = csv_records(&bytes);
    assert_eq!(headers.len(), 16_385);
    assert_eq!(rows, 1);
}

#[test]
fn workbook_starts_with_a_summary() {
    let tables = [coverage("Dakar"), coverage("Thiès")];
    let bytes = export_workbook(&tables, exported_at()).expect("workbook");
    let mut workbook = sheets(bytes);
    assert_eq!(workbook.sheet_names(), [SUMMARY_SHEET, "Dakar", "Thiès"]);
    assert_eq!(
        sheet_rows(&mut workbook, SUMMARY_SHEET),
        [
            ["name", "rows", "columns", "exported_at"],
            ["Dakar", "2", "3", "2024-05-01 08:30:00"],
            ["Thiès", "2", "3", "2024-05-01 08:30:00"],
        ]
    );
}

#[test]
fn repeated_error_items_keep_every_sheet() {
    let tables = [
        coverage("Couverture"),
        error_table(),
        error_table(),
        coverage("Cas [Dakar]"),
    ];
    let bytes = export_workbook(&tables, exported_at()).expect("workbook");
    assert_eq!(ExportFormat::sniff(&bytes), ExportFormat::Xlsx);
    let mut workbook = sheets(bytes);
    assert_eq!(
        workbook.sheet_names(),
        [SUMMARY_SHEET, "Couverture", "Erreur", "Erreur_1", "Cas _Dakar_"]
    );
    assert_eq!(
        sheet_rows(&mut workbook, "Erreur_1"),
        [["Erreur", "Élément"], ["identifiant manquant", "CPN"]]
    );
}

#[test]
fn colliding_sheet_names_fall_back_to_summary_csv() {
    let prefix = "x".repeat(31);
    let tables = [
        coverage(&format!("{prefix}-janvier")),
        coverage(&format!("{prefix}-février")),
    ];
    let bytes = export_workbook(&tables, exported_at()).expect("fallback");
    assert_eq!(ExportFormat::sniff(&bytes), ExportFormat::Csv);
    let (headers, rows) = csv_records(&bytes);
    assert_eq!(headers, ["name", "rows", "columns", "exported_at"]);
    assert_eq!(rows, 2);
}

#[test]
fn written_files_follow_the_produced_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bytes = export(&too_wide(), ExportFormat::Xlsx).expect("fallback");
    let path = write_export(dir.path(), "Cas: Dakar?", &bytes).expect("write");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("Cas_ Dakar_.csv"));
    assert_eq!(std::fs::read(&path).expect("read"), bytes);

    let bytes = export(&coverage("Dakar"), ExportFormat::Xlsx).expect("xlsx");
    let path = write_export(&dir.path().join("nested"), "Dakar", &bytes).expect("write");
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));
}

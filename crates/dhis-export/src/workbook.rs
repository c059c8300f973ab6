//! XLSX workbooks.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use dhis_model::{CellValue, ResolvedTable};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};

/// Excel's sheet name limit.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

pub const SUMMARY_SHEET: &str = "Summary";

/// Sheet used when a table name has nothing Excel accepts.
pub const FALLBACK_SHEET: &str = "Données";

/// Characters Excel rejects in sheet names.
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// `name` made acceptable to Excel: rejected characters become `_`, outer
/// apostrophes are dropped and the result is cut to
/// [`MAX_SHEET_NAME_CHARS`] characters.
pub fn sheet_name(name: &str) -> String {
    clean_sheet_name(name).chars().take(MAX_SHEET_NAME_CHARS).collect()
}

fn clean_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim().trim_matches('\'');
    if trimmed.is_empty() {
        FALLBACK_SHEET.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sheet names for `tables`, after the already taken `reserved` names.
///
/// Equal names (ignoring case, as Excel does) get `_1`, `_2`, … before
/// truncation. Names that only collide once truncated are kept as is.
pub fn sheet_names<'a, I>(reserved: &[&str], tables: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ResolvedTable>,
{
    let mut seen: HashSet<String> = reserved.iter().map(|name| name.to_lowercase()).collect();
    let mut out = Vec::new();
    for table in tables {
        let base = clean_sheet_name(table.name());
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        out.push(candidate.chars().take(MAX_SHEET_NAME_CHARS).collect());
    }
    out
}

/// One row per table: name, rows, columns, export time.
pub fn summary_table(tables: &[ResolvedTable], exported_at: NaiveDateTime) -> ResolvedTable {
    let exported_at = exported_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let rows = tables
        .iter()
        .map(|table| {
            vec![
                CellValue::text(table.name()),
                CellValue::Number(table.row_count() as f64),
                CellValue::Number(table.column_count() as f64),
                CellValue::text(exported_at.as_str()),
            ]
        })
        .collect();
    ResolvedTable::from_rows(
        SUMMARY_SHEET,
        ["name", "rows", "columns", "exported_at"],
        rows,
    )
}

pub(crate) fn single_sheet(table: &ResolvedTable) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    write_sheet(workbook.add_worksheet(), &sheet_name(table.name()), table, &header)?;
    workbook.save_to_buffer()
}

pub(crate) fn with_summary(
    summary: &ResolvedTable,
    tables: &[ResolvedTable],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    write_sheet(workbook.add_worksheet(), SUMMARY_SHEET, summary, &header)?;
    let names = sheet_names(&[SUMMARY_SHEET], tables);
    for (table, name) in tables.iter().zip(&names) {
        write_sheet(workbook.add_worksheet(), name, table, &header)?;
    }
    workbook.save_to_buffer()
}

fn write_sheet(
    sheet: &mut Worksheet,
    name: &str,
    table: &ResolvedTable,
    header: &Format,
) -> Result<(), XlsxError> {
    sheet.set_name(name)?;
    for (col, name) in table.column_names().into_iter().enumerate() {
        sheet.write_string_with_format(0, col_num(col)?, name, header)?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = RowNum::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.iter().enumerate() {
            let col = col_num(col)?;
            match cell {
                CellValue::Number(value) if value.is_finite() => {
                    sheet.write_number(row_num, col, *value)?;
                }
                CellValue::Number(_) | CellValue::Missing => {}
                CellValue::Text(text) => {
                    sheet.write_string(row_num, col, text)?;
                }
                CellValue::DateTime(_) => {
                    sheet.write_string(row_num, col, cell.to_string())?;
                }
            }
        }
    }
    Ok(())
}

fn col_num(idx: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn sheet_names_are_truncated_by_character() {
        let name = "Évolution mensuelle des consultations prénatales";
        let truncated = sheet_name(name);
        assert_eq!(truncated.chars().count(), MAX_SHEET_NAME_CHARS);
        assert!(name.starts_with(&truncated));
        assert_eq!(sheet_name("Données"), "Données");
    }

    #[test]
    fn rejected_characters_are_replaced() {
        assert_eq!(sheet_name("ANC / couverture"), "ANC _ couverture");
        assert_eq!(sheet_name("Cas [Dakar]: total?"), "Cas _Dakar__ total_");
        assert_eq!(sheet_name("'Cité'"), "Cité");
        assert_eq!(sheet_name("  "), FALLBACK_SHEET);
    }

    #[test]
    fn equal_names_get_suffixes() {
        let tables = [
            ResolvedTable::new("Erreur", ["Erreur"]),
            ResolvedTable::new("Couverture", ["x"]),
            ResolvedTable::new("erreur", ["Erreur"]),
            ResolvedTable::new("Erreur", ["Erreur"]),
            ResolvedTable::new("summary", ["x"]),
        ];
        assert_eq!(
            sheet_names(&[SUMMARY_SHEET], &tables),
            ["Erreur", "Couverture", "erreur_1", "Erreur_2", "summary_1"]
        );
    }

    #[test]
    fn truncation_collisions_are_kept() {
        let prefix = "x".repeat(MAX_SHEET_NAME_CHARS);
        let tables = [
            ResolvedTable::new(format!("{prefix}-a"), ["x"]),
            ResolvedTable::new(format!("{prefix}-b"), ["x"]),
        ];
        let names = sheet_names(&[], &tables);
        assert_eq!(names[0], prefix);
        assert_eq!(names[1], prefix);
    }

    #[test]
    fn summary_lists_every_table() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("datetime");
        let tables = [
            ResolvedTable::new("A", ["x", "y"]),
            ResolvedTable::from_rows("B", ["x"], vec![vec![CellValue::Number(1.0)]]),
        ];
        let summary = summary_table(&tables, at);
        assert_eq!(summary.name(), SUMMARY_SHEET);
        assert_eq!(summary.row_count(), 2);
        assert_eq!(summary.cell(1, 1), Some(&CellValue::Number(1.0)));
        assert_eq!(summary.cell(0, 2), Some(&CellValue::Number(2.0)));
        assert_eq!(summary.cell(0, 3), Some(&CellValue::text("2024-05-01 08:30:00")));
    }
}

//! Parsing of visualization and analytics payloads into tables.

use std::collections::HashMap;

use dhis_model::{CellValue, ResolvedTable};
use serde_json::{Map, Value};

use crate::error::ParseError;

/// A parsed payload and the status line describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    pub table: ResolvedTable,
    pub status: String,
}

/// Parse a `/data`, `/data.json` or `/api/analytics` body.
///
/// Two shapes are accepted: `{headers, rows, metaData}` and
/// `{data: [{...}, ...]}`. Zero rows is an error so the caller can try the
/// next source.
pub fn parse_series(body: &str, name: &str) -> Result<ParsedSeries, ParseError> {
    let payload: Value = serde_json::from_str(body)?;
    let Some(object) = payload.as_object() else {
        return Err(ParseError::UnrecognizedShape);
    };

    if object.contains_key("rows") {
        let table = parse_rows(object, name)?;
        let status = format!("Données récupérées ({} lignes)", table.row_count());
        return Ok(ParsedSeries { table, status });
    }

    if let Some(Value::Array(records)) = object.get("data") {
        let table = parse_records(records, name)?;
        let status = format!("Données au format liste ({} lignes)", table.row_count());
        return Ok(ParsedSeries { table, status });
    }

    Err(ParseError::UnrecognizedShape)
}

fn parse_rows(object: &Map<String, Value>, name: &str) -> Result<ResolvedTable, ParseError> {
    let rows = match object.get("rows") {
        Some(Value::Array(rows)) => rows.as_slice(),
        _ => &[],
    };
    let Some(first) = rows.first() else {
        return Err(ParseError::NoRows);
    };
    let width = first.as_array().map_or(0, Vec::len);
    if width == 0 {
        return Err(ParseError::UnrecognizedShape);
    }

    let headers = match object.get("headers") {
        Some(Value::Array(headers)) => headers.as_slice(),
        _ => &[],
    };
    let mut names = header_names(headers);
    names.truncate(width);
    while names.len() < width {
        names.push(placeholder_name(names.len()));
    }

    let mut table = ResolvedTable::new(name, names);
    for row in rows {
        let cells = row
            .as_array()
            .map(|cells| cells.iter().map(CellValue::from_json).collect())
            .unwrap_or_default();
        table.push_row(cells);
    }

    let names = metadata_names(object);
    if !names.is_empty() {
        table.map_text_cells(|id| names.get(id).cloned());
    }
    table.infer_kinds();
    table.coerce_numeric();
    Ok(table)
}

fn parse_records(records: &[Value], name: &str) -> Result<ResolvedTable, ParseError> {
    let objects: Vec<&Map<String, Value>> = records.iter().filter_map(Value::as_object).collect();
    if objects.is_empty() {
        return Err(ParseError::NoRows);
    }

    let mut keys: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            keys.iter()
                .map(|key| object.get(*key).map_or(CellValue::Missing, CellValue::from_json))
                .collect()
        })
        .collect();
    let mut table = ResolvedTable::from_rows(name, keys.iter().copied(), rows);
    table.coerce_numeric();
    Ok(table)
}

/// Column name per header: `name`, else `column`, else a positional placeholder.
fn header_names(headers: &[Value]) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            ["name", "column"]
                .iter()
                .find_map(|key| {
                    header
                        .get(*key)
                        .and_then(Value::as_str)
                        .filter(|value| !value.is_empty())
                })
                .map_or_else(|| placeholder_name(idx), str::to_string)
        })
        .collect()
}

fn placeholder_name(idx: usize) -> String {
    format!("Colonne_{idx}")
}

/// `metaData.items` as an id to display-name map.
fn metadata_names(object: &Map<String, Value>) -> HashMap<String, String> {
    object
        .get("metaData")
        .and_then(|meta| meta.get("items"))
        .and_then(Value::as_object)
        .map(|items| {
            items
                .iter()
                .filter_map(|(id, item)| {
                    item.get("name")
                        .and_then(Value::as_str)
                        .map(|name| (id.clone(), name.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

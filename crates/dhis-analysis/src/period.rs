//! Date parsing for temporal columns and period bucketing.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use dhis_model::CellValue;
use serde::{Deserialize, Serialize};

/// Aggregation period of the temporal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    /// ISO week, `YYYY-Www`.
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Journalier",
            Self::Weekly => "Hebdomadaire",
            Self::Monthly => "Mensuel",
            Self::Quarterly => "Trimestriel",
            Self::Yearly => "Annuel",
        }
    }

    /// Sortable key of the period holding `value`.
    pub fn key(&self, value: NaiveDateTime) -> String {
        match self {
            Self::Daily => value.format("%Y-%m-%d").to_string(),
            Self::Weekly => value.format("%G-W%V").to_string(),
            Self::Monthly => value.format("%Y-%m").to_string(),
            Self::Quarterly => format!("{}-Q{}", value.year(), value.month0() / 3 + 1),
            Self::Yearly => value.format("%Y").to_string(),
        }
    }
}

/// Interpret a cell as a point in time.
///
/// Accepts datetime cells, ISO dates and datetimes, `YYYY-MM`, `YYYY`,
/// `DD/MM/YYYY`, quarter labels (`2024Q1`, `Q1-2024`) and the DHIS2 period
/// ids `YYYYMMDD`, `YYYYMM`, `YYYYQn` and `YYYYWn`. Integral numbers are read
/// as period ids.
pub fn parse_cell(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(value) => Some(*value),
        CellValue::Number(value) if value.fract() == 0.0 && *value >= 0.0 => {
            parse_text(&format!("{value:.0}"))
        }
        CellValue::Text(text) => parse_text(text),
        CellValue::Number(_) | CellValue::Missing => None,
    }
}

pub fn parse_text(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(midnight(date));
        }
    }

    parse_compact(text).map(midnight)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn number<T: std::str::FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Year-month, bare year, quarter and DHIS2 period forms.
fn parse_compact(text: &str) -> Option<NaiveDate> {
    if let Some((year, month)) = text.split_once('-')
        && year.len() == 4
        && month.len() == 2
    {
        return NaiveDate::from_ymd_opt(number(year)?, number(month)?, 1);
    }

    if let Some((quarter, year)) = text.split_once('-')
        && let Some(quarter) = quarter.strip_prefix(['Q', 'q'])
    {
        return quarter_start(number(year)?, number(quarter)?);
    }

    if text.len() >= 6
        && let Some((year, rest)) = text.split_at_checked(4)
        && let Some(year) = number::<i32>(year)
    {
        if let Some(quarter) = rest.strip_prefix(['Q', 'q']) {
            return quarter_start(year, number(quarter)?);
        }
        if let Some(week) = rest.strip_prefix(['W', 'w']) {
            return NaiveDate::from_isoywd_opt(year, number(week)?, Weekday::Mon);
        }
    }

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match text.len() {
        4 => NaiveDate::from_ymd_opt(number(text)?, 1, 1),
        6 => NaiveDate::from_ymd_opt(number(&text[..4])?, number(&text[4..])?, 1),
        8 => NaiveDate::from_ymd_opt(
            number(&text[..4])?,
            number(&text[4..6])?,
            number(&text[6..])?,
        ),
        _ => None,
    }
}

fn quarter_start(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("date")
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn accepted_forms() {
        assert_eq!(parse_text("2024-03-15"), Some(date(2024, 3, 15)));
        assert_eq!(
            parse_text("2024-03-15T08:30:00.000"),
            NaiveDate::from_ymd_opt(2024, 3, 15).and_then(|d| d.and_hms_opt(8, 30, 0))
        );
        assert_eq!(parse_text("2024-03"), Some(date(2024, 3, 1)));
        assert_eq!(parse_text("2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_text("20240315"), Some(date(2024, 3, 15)));
        assert_eq!(parse_text("202403"), Some(date(2024, 3, 1)));
        assert_eq!(parse_text("2024Q3"), Some(date(2024, 7, 1)));
        assert_eq!(parse_text("Q2-2024"), Some(date(2024, 4, 1)));
        assert_eq!(parse_text("2024W1"), Some(date(2024, 1, 1)));
        assert_eq!(parse_text("15/03/2024"), Some(date(2024, 3, 15)));
    }

    #[test]
    fn rejected_forms() {
        for text in ["", "Semaine 5", "2024-13", "2024Q5", "Dakar", "12", "2024-W"] {
            assert_eq!(parse_text(text), None, "{text}");
        }
    }

    #[test]
    fn numbers_are_period_ids() {
        assert_eq!(parse_cell(&CellValue::Number(202401.0)), Some(date(2024, 1, 1)));
        assert_eq!(parse_cell(&CellValue::Number(2.5)), None);
        assert_eq!(parse_cell(&CellValue::Missing), None);
    }

    #[test]
    fn period_keys() {
        let value = date(2024, 12, 30);
        assert_eq!(Period::Daily.key(value), "2024-12-30");
        assert_eq!(Period::Weekly.key(value), "2025-W01");
        assert_eq!(Period::Monthly.key(value), "2024-12");
        assert_eq!(Period::Quarterly.key(value), "2024-Q4");
        assert_eq!(Period::Yearly.key(value), "2024");
    }
}

//! Column classification by declared kind and name keywords.

use dhis_model::{ColumnKind, ResolvedTable};
use serde::Serialize;

/// Name fragments marking a time axis.
pub const TEMPORAL_KEYWORDS: &[&str] = &[
    "date",
    "mois",
    "année",
    "trimestre",
    "semaine",
    "jour",
    "période",
    "time",
    "timestamp",
    "month",
    "year",
    "quarter",
    "week",
    "day",
    "period",
];

/// Name fragments marking a place.
pub const GEOGRAPHIC_KEYWORDS: &[&str] = &[
    "région",
    "region",
    "district",
    "province",
    "ville",
    "city",
    "département",
    "department",
    "commune",
    "zone",
    "pays",
    "country",
];

/// Name fragments marking a performance indicator.
pub const PERFORMANCE_KEYWORDS: &[&str] = &[
    "%",
    "pourcentage",
    "taux",
    "performance",
    "réalisation",
    "cible",
    "score",
    "rate",
    "target",
];

fn matches_any(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword))
}

/// Primary role of a column, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Temporal,
    Geographic,
    Numeric,
    Categorical,
}

impl ColumnRole {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Temporal => "Temporelle",
            Self::Geographic => "Géographique",
            Self::Numeric => "Numérique",
            Self::Categorical => "Catégorielle",
        }
    }
}

/// How one column may be used by the views.
///
/// `numeric` and `categorical` follow the declared kind and exclude each
/// other. `temporal` and `geographic` are tags on top of that: a numeric
/// `Semaine` column is both numeric and temporal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub index: usize,
    pub name: String,
    pub kind: ColumnKind,
    pub temporal: bool,
    pub geographic: bool,
    pub performance: bool,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn is_categorical(&self) -> bool {
        !self.is_numeric()
    }

    pub fn role(&self) -> ColumnRole {
        if self.temporal {
            ColumnRole::Temporal
        } else if self.geographic {
            ColumnRole::Geographic
        } else if self.is_numeric() {
            ColumnRole::Numeric
        } else {
            ColumnRole::Categorical
        }
    }
}

/// Profiles of every column of one table. Derived on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub columns: Vec<ColumnProfile>,
}

impl Classification {
    pub fn of(table: &ResolvedTable) -> Self {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnProfile {
                index,
                name: column.name.clone(),
                kind: column.kind,
                temporal: column.kind == ColumnKind::DateTime
                    || matches_any(&column.name, TEMPORAL_KEYWORDS),
                geographic: matches_any(&column.name, GEOGRAPHIC_KEYWORDS),
                performance: matches_any(&column.name, PERFORMANCE_KEYWORDS),
            })
            .collect();
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn numeric(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn categorical(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.is_categorical())
    }

    pub fn temporal(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.temporal)
    }

    pub fn geographic(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.geographic)
    }

    /// Numeric columns worth offering as performance indicators: keyword
    /// matches first, then every other numeric column.
    pub fn performance_candidates(&self) -> Vec<&ColumnProfile> {
        let (mut matched, rest): (Vec<_>, Vec<_>) =
            self.numeric().partition(|column| column.performance);
        matched.extend(rest);
        matched
    }
}

#[cfg(test)]
mod tests {
    use dhis_model::CellValue;

    use super::*;

    fn table() -> ResolvedTable {
        ResolvedTable::from_rows(
            "t",
            ["Région", "Mois", "Valeur", "Taux de couverture (%)", "Semaine", "Vaccin"],
            vec![vec![
                CellValue::text("Dakar"),
                CellValue::text("2024-01"),
                CellValue::Number(3.0),
                CellValue::Number(91.5),
                CellValue::Number(4.0),
                CellValue::text("BCG"),
            ]],
        )
    }

    fn names<'a>(columns: impl IntoIterator<Item = &'a ColumnProfile>) -> Vec<&'a str> {
        columns.into_iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn roles_follow_kind_and_keywords() {
        let classification = Classification::of(&table());
        assert_eq!(
            names(classification.numeric()),
            vec!["Valeur", "Taux de couverture (%)", "Semaine"]
        );
        assert_eq!(names(classification.categorical()), vec!["Région", "Mois", "Vaccin"]);
        assert_eq!(names(classification.temporal()), vec!["Mois", "Semaine"]);
        assert_eq!(names(classification.geographic()), vec!["Région"]);

        let week = classification.get("Semaine").expect("column");
        assert!(week.is_numeric());
        assert_eq!(week.role(), ColumnRole::Temporal);
        assert_eq!(
            classification.get("Vaccin").map(ColumnProfile::role),
            Some(ColumnRole::Categorical)
        );
    }

    #[test]
    fn keyword_matching_ignores_case() {
        let table = ResolvedTable::from_rows(
            "t",
            ["DISTRICT", "Date"],
            vec![vec![CellValue::text("D1"), CellValue::text("x")]],
        );
        let classification = Classification::of(&table);
        assert!(classification.columns[0].geographic);
        assert!(classification.columns[1].temporal);
    }

    #[test]
    fn performance_candidates_put_keyword_columns_first() {
        let classification = Classification::of(&table());
        assert_eq!(
            names(classification.performance_candidates()),
            vec!["Taux de couverture (%)", "Valeur", "Semaine"]
        );
    }
}

//! Synthetic datasets served when no live source returns rows.
//!
//! The category is picked from the item name; each category draws from its
//! own fixed seed, so the same item always renders the same table.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use dhis_model::{CellValue, ResolvedTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ResolveError;

/// Source of placeholder data, keyed by item name.
pub trait SyntheticSource {
    fn generate(&self, item_name: &str) -> Result<SyntheticDataset, ResolveError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub category: SyntheticCategory,
    pub table: ResolvedTable,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticCategory {
    Vaccination,
    Malaria,
    Nutrition,
    Consultation,
    Birth,
    Mortality,
    Performance,
    MultiDimensional,
}

impl SyntheticCategory {
    /// Keyword categories in matching order; the first hit wins.
    const MATCH_ORDER: [Self; 7] = [
        Self::Vaccination,
        Self::Malaria,
        Self::Nutrition,
        Self::Consultation,
        Self::Birth,
        Self::Mortality,
        Self::Performance,
    ];

    const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Vaccination => &["vaccin", "immunisation", "vax"],
            Self::Malaria => &["paludisme", "malaria"],
            Self::Nutrition => &["nutrition", "malnutrition"],
            Self::Consultation => &["consultation", "visite"],
            Self::Birth => &["naissance", "accouchement"],
            Self::Mortality => &["mortalité", "décès"],
            Self::Performance => &["ecv", "dsdm", "performance", "indicateur"],
            Self::MultiDimensional => &[],
        }
    }

    /// Case-insensitive substring match of `name` against the keyword sets.
    pub fn for_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| {
                category
                    .keywords()
                    .iter()
                    .any(|keyword| lower.contains(keyword))
            })
            .unwrap_or(Self::MultiDimensional)
    }

    const fn seed(self) -> u64 {
        match self {
            Self::Vaccination => 101,
            Self::Malaria => 102,
            Self::Nutrition => 103,
            Self::Consultation => 104,
            Self::Birth => 105,
            Self::Mortality => 106,
            Self::Performance => 107,
            Self::MultiDimensional => 42,
        }
    }

    fn status(self, rows: usize) -> String {
        match self {
            Self::Vaccination => format!("Données vaccinales pour analyses ({rows} lignes)"),
            Self::Malaria => format!("Données paludisme pour analyses ({rows} lignes)"),
            Self::Nutrition => format!("Données nutritionnelles pour analyses ({rows} lignes)"),
            Self::Consultation => format!("Données de consultation pour analyses ({rows} lignes)"),
            Self::Birth => format!("Données de naissances pour analyses ({rows} lignes)"),
            Self::Mortality => format!("Données de mortalité pour analyses ({rows} lignes)"),
            Self::Performance => format!("Données ECV/DSDM prêtes pour analyse ({rows} lignes)"),
            Self::MultiDimensional => {
                format!("Données multi-dimensionnelles pour analyses ({rows} lignes)")
            }
        }
    }
}

/// The built-in generator: one fixed-seed dataset per category.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededGenerator;

impl SyntheticSource for SeededGenerator {
    fn generate(&self, item_name: &str) -> Result<SyntheticDataset, ResolveError> {
        let category = SyntheticCategory::for_name(item_name);
        let mut rng = StdRng::seed_from_u64(category.seed());
        let (headers, rows) = match category {
            SyntheticCategory::Vaccination => vaccination(&mut rng),
            SyntheticCategory::Malaria => malaria(&mut rng),
            SyntheticCategory::Nutrition => nutrition(&mut rng),
            SyntheticCategory::Consultation => consultation(&mut rng),
            SyntheticCategory::Birth => birth(&mut rng),
            SyntheticCategory::Mortality => mortality(&mut rng),
            SyntheticCategory::Performance => performance(&mut rng),
            SyntheticCategory::MultiDimensional => multi_dimensional(&mut rng)?,
        };
        let table = ResolvedTable::from_rows(item_name, headers.iter().copied(), rows);
        Ok(SyntheticDataset {
            category,
            status: category.status(table.row_count()),
            table,
        })
    }
}

type Generated = (&'static [&'static str], Vec<Vec<CellValue>>);

pub(crate) const REGIONS: [&str; 10] = [
    "Dakar",
    "Thiès",
    "Diourbel",
    "Saint-Louis",
    "Kaolack",
    "Louga",
    "Fatick",
    "Kaffrine",
    "Matam",
    "Kédougou",
];

const MONTHS: [&str; 6] = [
    "2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06",
];

const QUARTERS: [&str; 4] = ["Q1-2024", "Q2-2024", "Q3-2024", "Q4-2024"];

const TRENDS: [&str; 3] = ["Hausse", "Stable", "Baisse"];

fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn count(rng: &mut StdRng, low: i32, high: i32) -> f64 {
    f64::from(rng.gen_range(low..high))
}

fn attainment(value: f64, reached: f64, partial: f64) -> &'static str {
    if value >= reached {
        "Atteint"
    } else if value >= partial {
        "Partiel"
    } else {
        "Non atteint"
    }
}

fn vaccination(rng: &mut StdRng) -> Generated {
    const VACCINES: [&str; 8] = [
        "BCG",
        "Polio 0",
        "Penta1",
        "Penta2",
        "Penta3",
        "Rougeole",
        "Fièvre Jaune",
        "VAR",
    ];
    let mut rows = Vec::new();
    for region in REGIONS {
        for month in MONTHS {
            for vaccine in VACCINES {
                for age in ["<1 an", "1-4 ans", "5-14 ans"] {
                    let doses = count(rng, 100, 2000);
                    let target = (doses * rng.gen_range(1.1..1.5)).floor();
                    let coverage = if target > 0.0 {
                        doses / target * 100.0
                    } else {
                        0.0
                    };
                    rows.push(vec![
                        text(region),
                        text(month),
                        text(vaccine),
                        text(age),
                        num(doses),
                        num(target),
                        num(round_to(coverage, 1)),
                        text(attainment(coverage, 90.0, 70.0)),
                        text(pick(rng, &TRENDS)),
                    ]);
                }
            }
        }
    }
    (
        &[
            "Région",
            "Mois",
            "Vaccin",
            "Groupe d'âge",
            "Doses administrées",
            "Cible",
            "Couverture (%)",
            "Statut",
            "Tendance",
        ],
        rows,
    )
}

fn malaria(rng: &mut StdRng) -> Generated {
    let mut rows = Vec::new();
    for district in 1..=15 {
        for week in 1..=26 {
            for age in ["<5 ans", "5-14 ans", "15+ ans"] {
                let confirmed = count(rng, 10, 200);
                let tested = confirmed + count(rng, 0, 100);
                let positivity = if tested > 0.0 {
                    confirmed / tested * 100.0
                } else {
                    0.0
                };
                let severe = (confirmed * rng.gen_range(0.05..0.15)).floor();
                let max_deaths = (severe * 0.1).floor() as i32;
                let deaths = f64::from(rng.gen_range(0..=max_deaths));
                let alert = if positivity > 20.0 {
                    "Élevé"
                } else if positivity > 10.0 {
                    "Modéré"
                } else {
                    "Faible"
                };
                rows.push(vec![
                    text(&format!("District {district}")),
                    text(&format!("Semaine {week}")),
                    text(age),
                    num(tested),
                    num(confirmed),
                    num(round_to(positivity, 1)),
                    num(severe),
                    num(deaths),
                    text(pick(rng, &TRENDS)),
                    text(alert),
                ]);
            }
        }
    }
    (
        &[
            "District",
            "Semaine",
            "Groupe d'âge",
            "Tests réalisés",
            "Cas confirmés",
            "Taux de positivité (%)",
            "Cas sévères",
            "Décès",
            "Tendance",
            "Niveau d'alerte",
        ],
        rows,
    )
}

fn nutrition(rng: &mut StdRng) -> Generated {
    let mut rows = Vec::new();
    for region in REGIONS {
        for month in MONTHS {
            for age in ["0-5 mois", "6-23 mois", "24-59 mois"] {
                let screened = count(rng, 200, 1500);
                let severe = (screened * rng.gen_range(0.01..0.05)).floor();
                let moderate = (screened * rng.gen_range(0.05..0.15)).floor();
                let rate = (severe + moderate) / screened * 100.0;
                let alert = if rate > 15.0 {
                    "Élevé"
                } else if rate > 10.0 {
                    "Modéré"
                } else {
                    "Faible"
                };
                rows.push(vec![
                    text(region),
                    text(month),
                    text(age),
                    num(screened),
                    num(severe),
                    num(moderate),
                    num(round_to(rate, 1)),
                    num(round_to(rng.gen_range(60.0..95.0), 1)),
                    text(alert),
                ]);
            }
        }
    }
    (
        &[
            "Région",
            "Mois",
            "Groupe d'âge",
            "Enfants dépistés",
            "Cas MAS",
            "Cas MAM",
            "Taux de malnutrition (%)",
            "Taux de guérison (%)",
            "Niveau d'alerte",
        ],
        rows,
    )
}

fn consultation(rng: &mut StdRng) -> Generated {
    const SERVICES: [&str; 4] = ["Médecine générale", "Pédiatrie", "Maternité", "Urgences"];
    let mut rows = Vec::new();
    for region in REGIONS {
        for month in MONTHS {
            for service in SERVICES {
                let visits = count(rng, 200, 3000);
                let new_cases = (visits * rng.gen_range(0.3..0.7)).floor();
                rows.push(vec![
                    text(region),
                    text(month),
                    text(service),
                    num(visits),
                    num(new_cases),
                    num(round_to(rng.gen_range(40.0..95.0), 1)),
                    num(round_to(rng.gen_range(60.0..98.0), 1)),
                    num(round_to(rng.gen_range(10.0..120.0), 0)),
                ]);
            }
        }
    }
    (
        &[
            "Région",
            "Mois",
            "Service",
            "Consultations",
            "Nouveaux cas",
            "Taux de fréquentation (%)",
            "Satisfaction (%)",
            "Délai d'attente (min)",
        ],
        rows,
    )
}

fn birth(rng: &mut StdRng) -> Generated {
    let mut rows = Vec::new();
    for region in REGIONS {
        for month in MONTHS {
            let births = count(rng, 300, 3000);
            let assisted = (births * rng.gen_range(0.6..0.98)).floor();
            let rate = assisted / births * 100.0;
            rows.push(vec![
                text(region),
                text(month),
                num(births),
                num(assisted),
                num(round_to(rate, 1)),
                num((births * rng.gen_range(0.02..0.1)).floor()),
                num((births * rng.gen_range(0.05..0.15)).floor()),
                text(attainment(rate, 90.0, 75.0)),
            ]);
        }
    }
    (
        &[
            "Région",
            "Mois",
            "Naissances vivantes",
            "Accouchements assistés",
            "Taux d'accouchement assisté (%)",
            "Césariennes",
            "Faible poids de naissance",
            "Statut",
        ],
        rows,
    )
}

fn mortality(rng: &mut StdRng) -> Generated {
    const CAUSES: [&str; 5] = [
        "Paludisme",
        "Infections respiratoires",
        "Diarrhée",
        "Malnutrition",
        "Autres",
    ];
    let mut rows = Vec::new();
    for region in REGIONS {
        for quarter in QUARTERS {
            for cause in CAUSES {
                for age in ["<5 ans", "5-14 ans", "15-49 ans", "50+ ans"] {
                    let population = count(rng, 10_000, 200_000);
                    let deaths = count(rng, 0, 120);
                    rows.push(vec![
                        text(region),
                        text(quarter),
                        text(cause),
                        text(age),
                        num(population),
                        num(deaths),
                        num(round_to(deaths / population * 1000.0, 2)),
                    ]);
                }
            }
        }
    }
    (
        &[
            "Région",
            "Trimestre",
            "Cause",
            "Groupe d'âge",
            "Population",
            "Décès",
            "Taux de mortalité (‰)",
        ],
        rows,
    )
}

fn performance(rng: &mut StdRng) -> Generated {
    const INDICATORS: [&str; 8] = [
        "Couverture vaccinale Penta3",
        "Couverture vaccinale VAR",
        "Taux de consultation prénatale (CPN4+)",
        "Taux d'accouchement assisté",
        "Taux de dépistage VIH",
        "Taux de traitement du paludisme",
        "Prévalence malnutrition aigüe",
        "Taux de mortalité infanto-juvénile",
    ];
    let mut rows = Vec::new();
    for region in REGIONS {
        for quarter in QUARTERS {
            for indicator in INDICATORS {
                let value: f64 = rng.gen_range(50.0..100.0);
                let target = if indicator.contains("vaccinale") {
                    95.0
                } else {
                    80.0
                };
                let achievement = round_to(value / target * 100.0, 1);
                let category = if achievement >= 110.0 {
                    "Excellente"
                } else if achievement >= 90.0 {
                    "Bonne"
                } else if achievement >= 70.0 {
                    "Satisfaisante"
                } else {
                    "À améliorer"
                };
                rows.push(vec![
                    text(region),
                    text(quarter),
                    text(indicator),
                    num(round_to(value, 1)),
                    num(target),
                    num(achievement),
                    text(attainment(achievement, 100.0, 80.0)),
                    text(category),
                ]);
            }
        }
    }
    (
        &[
            "Région",
            "Trimestre",
            "Indicateur",
            "Valeur (%)",
            "Cible (%)",
            "Réalisation (%)",
            "Statut",
            "Catégorie Performance",
        ],
        rows,
    )
}

fn multi_dimensional(rng: &mut StdRng) -> Result<Generated, ResolveError> {
    const ROWS: u64 = 100;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| ResolveError::Generator("date de départ invalide".to_string()))?;

    let districts: Vec<String> = (1..=10).map(|i| format!("District {i}")).collect();
    let centers: Vec<String> = (1..=20).map(|i| format!("CS {i}")).collect();

    let mut rows = Vec::new();
    for offset in 0..ROWS {
        let date = start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| ResolveError::Generator("date hors limites".to_string()))?;
        let consultations = count(rng, 50, 500);
        let hospitalisations = count(rng, 0, 50);
        let occupancy = rng.gen_range(60.0..100.0);
        let satisfaction = rng.gen_range(70.0..100.0);
        let delay = rng.gen_range(0.0..10.0);
        let cost = rng.gen_range(100.0..1000.0);
        let productivity = rng.gen_range(80.0..120.0);
        let quality = rng.gen_range(85.0..100.0);
        let district = &districts[rng.gen_range(0..districts.len())];
        let center = &centers[rng.gen_range(0..centers.len())];

        rows.push(vec![
            num((offset + 1) as f64),
            CellValue::DateTime(date.and_time(NaiveTime::MIN)),
            text(pick(
                rng,
                &["Dakar", "Thiès", "Diourbel", "Saint-Louis", "Kaolack"],
            )),
            text(district),
            text(center),
            text(pick(rng, &["A", "B", "C", "D", "E"])),
            text(pick(rng, &["X", "Y", "Z"])),
            text(pick(rng, &["Masculin", "Féminin"])),
            text(pick(rng, &["0-4 ans", "5-14 ans", "15-49 ans", "50+ ans"])),
            num(consultations),
            num(hospitalisations),
            num(round_to(occupancy, 2)),
            num(round_to(satisfaction, 2)),
            num(round_to(delay, 2)),
            num(round_to(cost, 2)),
            num(round_to(productivity, 2)),
            num(round_to(quality, 2)),
            num(round_to(hospitalisations / consultations, 4)),
            num(round_to(productivity * quality / 100.0, 2)),
            num(round_to(
                occupancy * 0.3 + satisfaction * 0.3 + quality * 0.4,
                2,
            )),
            text(&date.format("%Y-%m").to_string()),
            num(f64::from(date.iso_week().week())),
            text(&date.format("%A").to_string()),
        ]);
    }
    Ok((
        &[
            "ID",
            "Date",
            "Région",
            "District",
            "Établissement",
            "Catégorie",
            "Sous-Catégorie",
            "Genre",
            "Groupe d'âge",
            "Consultations",
            "Hospitalisations",
            "Taux d'occupation",
            "Satisfaction (%)",
            "Délai moyen (jours)",
            "Coût moyen",
            "Productivité",
            "Qualité (%)",
            "Ratio Hosp/Cons",
            "Efficacité",
            "Performance",
            "Mois",
            "Semaine",
            "Jour",
        ],
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use dhis_model::ColumnKind;

    use super::*;

    #[test]
    fn category_follows_keyword_order() {
        assert_eq!(
            SyntheticCategory::for_name("Couverture VACCINALE"),
            SyntheticCategory::Vaccination
        );
        assert_eq!(
            SyntheticCategory::for_name("Vaccination et paludisme"),
            SyntheticCategory::Vaccination
        );
        assert_eq!(
            SyntheticCategory::for_name("Cas de Malaria"),
            SyntheticCategory::Malaria
        );
        assert_eq!(
            SyntheticCategory::for_name("Décès maternels"),
            SyntheticCategory::Mortality
        );
        assert_eq!(
            SyntheticCategory::for_name("Indicateurs ECV"),
            SyntheticCategory::Performance
        );
        assert_eq!(
            SyntheticCategory::for_name("Élément"),
            SyntheticCategory::MultiDimensional
        );
    }

    #[test]
    fn datasets_are_deterministic() {
        let first = SeededGenerator.generate("Paludisme").expect("dataset");
        let second = SeededGenerator.generate("Paludisme").expect("dataset");
        assert_eq!(first, second);
    }

    #[test]
    fn dataset_sizes() {
        let cases = [
            ("Vaccination", 10 * 6 * 8 * 3),
            ("Paludisme", 15 * 26 * 3),
            ("Nutrition", 10 * 6 * 3),
            ("Consultation", 10 * 6 * 4),
            ("Naissance", 10 * 6),
            ("Mortalité", 10 * 4 * 5 * 4),
            ("DSDM", 10 * 4 * 8),
            ("Autre", 100),
        ];
        for (name, rows) in cases {
            let dataset = SeededGenerator.generate(name).expect("dataset");
            assert_eq!(dataset.table.row_count(), rows, "{name}");
            assert!(dataset.status.contains(&format!("({rows} lignes)")));
        }
    }

    #[test]
    fn multi_dimensional_has_dates_and_numbers() {
        let dataset = SeededGenerator.generate("Tableau").expect("dataset");
        let table = &dataset.table;
        let date = table.column("Date").expect("date column");
        assert_eq!(date.kind, ColumnKind::DateTime);
        assert_eq!(
            table.column("Consultations").expect("column").kind,
            ColumnKind::Numeric
        );
        assert_eq!(table.cell(0, 20), Some(&CellValue::text("2024-01")));
        assert_eq!(table.cell(0, 22), Some(&CellValue::text("Monday")));
    }

    #[test]
    fn malaria_deaths_never_exceed_severe_cases() {
        let dataset = SeededGenerator.generate("malaria").expect("dataset");
        let table = &dataset.table;
        let severe = table.column_index("Cas sévères").expect("severe");
        let deaths = table.column_index("Décès").expect("deaths");
        for row in table.rows() {
            let severe = row[severe].as_f64().expect("number");
            let deaths = row[deaths].as_f64().expect("number");
            assert!(deaths <= severe);
        }
    }
}

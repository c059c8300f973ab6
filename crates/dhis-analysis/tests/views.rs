//! Every view over one vaccination-style table.

use dhis_analysis::{
    Binning, ComparativeOptions, DescriptiveOptions, GeographicOptions, PerformanceOptions,
    Period, PredictiveOptions, TemporalOptions, TrendDirection, comparative, descriptive,
    geographic, performance, predictive, quality, temporal,
};
use dhis_model::{CellValue, ResolvedTable};

const REGIONS: [&str; 3] = ["Dakar", "Thiès", "Kolda"];
const VACCINES: [&str; 2] = ["BCG", "Penta3"];

fn coverage() -> ResolvedTable {
    let mut rows = Vec::new();
    for (r, region) in REGIONS.iter().enumerate() {
        for month in 1..=12 {
            for vaccine in VACCINES {
                let doses = 100.0 + r as f64 * 10.0 + f64::from(month);
                rows.push(vec![
                    CellValue::text(*region),
                    CellValue::text(format!("2024-{month:02}")),
                    CellValue::text(vaccine),
                    CellValue::Number(doses),
                    CellValue::Number(200.0),
                    CellValue::Number(doses / 2.0),
                ]);
            }
        }
    }
    ResolvedTable::from_rows(
        "Couverture vaccinale",
        [
            "Région",
            "Mois",
            "Vaccin",
            "Doses administrées",
            "Population",
            "Taux de couverture (%)",
        ],
        rows,
    )
}

#[test]
fn descriptive_overview() {
    let view = descriptive(&coverage(), &DescriptiveOptions::default()).expect("descriptive");
    assert_eq!(view.rows, 72);
    assert_eq!(view.columns, 6);
    assert_eq!(view.missing, 0);
    let distribution = view.distribution.expect("distribution");
    assert_eq!(distribution.column, "Doses administrées");
    assert_eq!(distribution.summary.expect("summary").count, 72);
    assert_eq!(distribution.histogram.len(), 30);
    let frequencies = view.frequencies.expect("frequencies");
    assert_eq!(frequencies.column, "Région");
    assert!(frequencies.counts.iter().all(|c| c.count == 24));
}

#[test]
fn temporal_monthly_trend() {
    let view = temporal(&coverage(), &TemporalOptions::default()).expect("temporal");
    assert_eq!(view.time_column, "Mois");
    assert_eq!(view.period, Some(Period::Monthly));
    assert_eq!(view.periods.len(), 12);
    assert_eq!(view.periods[0].period, "2024-01");
    let trend = view.trend.expect("trend");
    assert_eq!(trend.direction, TrendDirection::Upward);
    assert!((trend.r_squared - 1.0).abs() < 1e-9);
}

#[test]
fn geographic_ranking() {
    let view = geographic(&coverage(), &GeographicOptions::default()).expect("geographic");
    let order: Vec<&str> = view.top().iter().map(|g| g.key.as_str()).collect();
    assert_eq!(order, ["Kolda", "Thiès", "Dakar"]);
    assert_eq!(view.regions[0].count, 24);
}

#[test]
fn performance_bands_cover_every_row() {
    let options = PerformanceOptions::default();
    let view = performance(&coverage(), &options).expect("performance");
    assert_eq!(view.column, "Taux de couverture (%)");
    assert!(matches!(view.binning, Binning::Thresholds { .. }));
    assert_eq!(view.bands[0].count, 72);
    assert_eq!(view.bands[0].percentage, 100.0);
    assert_eq!(view.unclassified, 0);
    assert_eq!(view.sample.len(), 20);
}

#[test]
fn comparative_runs_anova_across_regions() {
    let view = comparative(&coverage(), &ComparativeOptions::default()).expect("comparative");
    assert_eq!(view.category_column, "Région");
    assert_eq!(view.groups.len(), 3);
    let anova = view.anova.expect("anova");
    assert!(anova.is_significant());
}

#[test]
fn predictive_recovers_the_ratio() {
    let options = PredictiveOptions {
        x_column: Some("Doses administrées".into()),
        y_column: Some("Taux de couverture (%)".into()),
        input: Some(150.0),
    };
    let view = predictive(&coverage(), &options).expect("predictive");
    assert_eq!(view.rows, 72);
    assert!((view.regression.slope - 0.5).abs() < 1e-9);
    assert!((view.prediction - 75.0).abs() < 1e-9);
}

#[test]
fn quality_of_a_complete_table() {
    let view = quality(&coverage());
    assert_eq!(view.missing_percentage, 0.0);
    assert_eq!(view.duplicate_rows, 0);
    assert_eq!(view.numeric_columns, 3);
    assert_eq!(view.zero_cells, 0);
}

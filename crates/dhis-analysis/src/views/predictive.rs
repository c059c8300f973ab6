//! Linear regression between two numeric columns.

use dhis_model::ResolvedTable;
use serde::Serialize;

use super::choose;
use crate::classify::Classification;
use crate::error::{RenderPrecondition, Result};
use crate::stats::{self, RegressionResult};

/// A fit needs strictly more complete rows than this.
pub const MIN_REGRESSION_ROWS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictiveOptions {
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    /// Where to evaluate the fitted line; the mean of X when unset.
    pub input: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveView {
    pub x_column: String,
    pub y_column: String,
    /// Rows where both values are present.
    pub rows: usize,
    pub regression: RegressionResult,
    pub r_squared: f64,
    pub x_range: (f64, f64),
    pub input: f64,
    pub prediction: f64,
}

pub fn predictive(table: &ResolvedTable, options: &PredictiveOptions) -> Result<PredictiveView> {
    let classification = Classification::of(table);
    let numeric: Vec<_> = classification.numeric().collect();
    if numeric.len() < 2 {
        return Err(RenderPrecondition::TooFewNumericColumns);
    }
    let x = choose(
        &classification,
        &numeric,
        options.x_column.as_deref(),
        RenderPrecondition::TooFewNumericColumns,
        "numérique",
    )?;
    let others: Vec<_> = numeric
        .iter()
        .copied()
        .filter(|column| column.index != x.index)
        .collect();
    let y = match options.y_column.as_deref() {
        Some(name) if name == x.name => return Err(RenderPrecondition::SameVariable),
        requested => choose(
            &classification,
            &others,
            requested,
            RenderPrecondition::TooFewNumericColumns,
            "numérique",
        )?,
    };

    let (xs, ys): (Vec<f64>, Vec<f64>) = table
        .rows()
        .iter()
        .filter_map(|row| Some((row[x.index].as_f64()?, row[y.index].as_f64()?)))
        .unzip();
    if xs.len() <= MIN_REGRESSION_ROWS {
        return Err(RenderPrecondition::TooFewRows {
            rows: xs.len(),
            required: MIN_REGRESSION_ROWS,
        });
    }

    let regression = stats::linear_regression(&xs, &ys);
    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let input = options
        .input
        .or_else(|| stats::mean(&xs))
        .unwrap_or_default();

    Ok(PredictiveView {
        x_column: x.name.clone(),
        y_column: y.name.clone(),
        rows: xs.len(),
        r_squared: regression.r_squared(),
        x_range: (x_min, x_max),
        input,
        prediction: regression.predict(input),
        regression,
    })
}

#[cfg(test)]
mod tests {
    use dhis_model::CellValue;

    use super::*;

    fn table(rows: usize) -> ResolvedTable {
        let rows = (0..rows)
            .map(|idx| {
                let x = idx as f64;
                vec![
                    CellValue::text("Dakar"),
                    CellValue::Number(x),
                    CellValue::Number(2.0 * x + 1.0),
                    CellValue::Number(5.0),
                ]
            })
            .collect();
        ResolvedTable::from_rows("t", ["Région", "Consultations", "Cas", "Cible"], rows)
    }

    #[test]
    fn exact_line_and_default_prediction() {
        let view = predictive(&table(11), &PredictiveOptions::default()).expect("view");
        assert_eq!(view.x_column, "Consultations");
        assert_eq!(view.y_column, "Cas");
        assert_eq!(view.rows, 11);
        assert!((view.regression.slope - 2.0).abs() < 1e-12);
        assert!((view.regression.intercept - 1.0).abs() < 1e-12);
        assert!((view.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(view.input, 5.0);
        assert!((view.prediction - 11.0).abs() < 1e-12);
        assert_eq!(view.x_range, (0.0, 10.0));
    }

    #[test]
    fn flat_x_gives_zero_slope() {
        let options = PredictiveOptions {
            x_column: Some("Cible".into()),
            y_column: Some("Cas".into()),
            input: Some(100.0),
        };
        let view = predictive(&table(12), &options).expect("view");
        assert_eq!(view.regression.slope, 0.0);
        assert_eq!(view.prediction, 12.0);
    }

    #[test]
    fn preconditions() {
        assert_eq!(
            predictive(&table(10), &PredictiveOptions::default()),
            Err(RenderPrecondition::TooFewRows {
                rows: 10,
                required: 10
            })
        );
        let same = PredictiveOptions {
            x_column: Some("Cas".into()),
            y_column: Some("Cas".into()),
            input: None,
        };
        assert_eq!(
            predictive(&table(20), &same),
            Err(RenderPrecondition::SameVariable)
        );
        let single = ResolvedTable::from_rows("t", ["Cas"], vec![vec![CellValue::Number(1.0)]]);
        assert_eq!(
            predictive(&single, &PredictiveOptions::default()),
            Err(RenderPrecondition::TooFewNumericColumns)
        );
    }
}

//! Descriptive statistics, least-squares regression and one-way ANOVA.
//!
//! Everything here works on plain `f64` slices with missing values already
//! removed. Quantiles use linear interpolation between order statistics and
//! standard deviations are sample (n - 1) deviations.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation; `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q` in `[0, 1]` by linear interpolation.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted(values);
    quantile_sorted(&sorted, q)
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// `describe()`-style summary of one numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty series.
    pub fn of(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted)?,
            std: sample_std(&sorted),
            min,
            q1: quantile_sorted(&sorted, 0.25)?,
            median: quantile_sorted(&sorted, 0.5)?,
            q3: quantile_sorted(&sorted, 0.75)?,
            max,
        })
    }
}

/// One histogram bin `[start, end)`; the last bin also holds `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram with `bins` bins over the value range.
///
/// A constant series is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (low, high) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (high - low) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|idx| Bin {
            start: low + width * idx as f64,
            end: if idx + 1 == bins {
                high
            } else {
                low + width * (idx + 1) as f64
            },
            count: 0,
        })
        .collect();
    for value in values {
        let idx = (((value - low) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Least-squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Two-sided p-value for a zero slope.
    pub p_value: f64,
}

impl RegressionResult {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Simple linear regression over paired samples.
///
/// Zero variance in `x` gives a zero slope; zero variance in either series
/// gives `r = 0`. Fewer than two pairs gives a flat line through zero with
/// `p = 1`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RegressionResult {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    let (Some(x_mean), Some(y_mean)) = (mean(x), mean(y)) else {
        return RegressionResult {
            slope: 0.0,
            intercept: 0.0,
            r_value: 0.0,
            p_value: 1.0,
        };
    };
    if n < 2 {
        return RegressionResult {
            slope: 0.0,
            intercept: 0.0,
            r_value: 0.0,
            p_value: 1.0,
        };
    }

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = y_mean - slope * x_mean;
    let r_value = if sxx > 0.0 && syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    RegressionResult {
        slope,
        intercept,
        r_value,
        p_value: correlation_p_value(r_value, n),
    }
}

fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n <= 2 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let denominator = 1.0 - r * r;
    if denominator <= 0.0 {
        return 0.0;
    }
    let t = r * (df / denominator).sqrt();
    student_t_two_sided(t, df)
}

/// Two-sided tail probability of Student's t with `df` degrees of freedom.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    regularized_incomplete_beta(df / (df + t * t), df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Upper tail probability of the F distribution.
pub fn f_survival(f: f64, df_between: f64, df_within: f64) -> f64 {
    if f.is_infinite() {
        return 0.0;
    }
    if f <= 0.0 {
        return 1.0;
    }
    let x = df_within / (df_within + df_between * f);
    regularized_incomplete_beta(x, df_within / 2.0, df_between / 2.0).clamp(0.0, 1.0)
}

/// One-way ANOVA result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
}

impl AnovaResult {
    pub fn is_significant(&self) -> bool {
        self.p_value < 0.05
    }
}

/// One-way ANOVA over groups of samples. Empty groups are ignored.
///
/// `None` when fewer than two groups remain or when nothing varies.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaResult> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand = mean(&all)?;
    let mut between = 0.0;
    let mut within = 0.0;
    for group in &groups {
        let group_mean = mean(group)?;
        between += group.len() as f64 * (group_mean - grand).powi(2);
        within += group.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    if within == 0.0 {
        if between == 0.0 {
            return None;
        }
        return Some(AnovaResult {
            f_statistic: f64::INFINITY,
            p_value: 0.0,
        });
    }
    let f_statistic = (between / df_between) / (within / df_within);
    Some(AnovaResult {
        f_statistic,
        p_value: f_survival(f_statistic, df_between, df_within),
    })
}

/// Regularized incomplete beta `I_x(a, b)`.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-14;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Lanczos approximation of `ln Γ(x)` for `x > 0`.
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.001_208_650_973_866_179,
        -0.000_005_395_239_384_953,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut series = 1.000_000_000_190_015;
    for coefficient in COEFFICIENTS {
        y += 1.0;
        series += coefficient / y;
    }
    -tmp + (2.506_628_274_631_000_5 * series / x).ln()
}

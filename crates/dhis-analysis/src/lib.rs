//! Column classification, statistics and analysis views over
//! [`dhis_model::ResolvedTable`].
//!
//! Every view is a pure function of a table and its options. When a table
//! cannot support a view, the view returns a [`RenderPrecondition`] whose
//! message is shown instead.

#![deny(unsafe_code)]

pub mod classify;
pub mod error;
pub mod period;
pub mod stats;
pub mod views;

pub use classify::{Classification, ColumnProfile, ColumnRole};
pub use error::{RenderPrecondition, Result};
pub use period::Period;
pub use stats::{AnovaResult, Bin, RegressionResult, Summary, linear_regression, one_way_anova};
pub use views::comparative::{ComparativeOptions, ComparativeView, comparative};
pub use views::descriptive::{DescriptiveOptions, DescriptiveView, descriptive, value_counts};
pub use views::geographic::{GeographicOptions, GeographicView, geographic};
pub use views::performance::{Binning, PerformanceOptions, PerformanceView, Thresholds, performance};
pub use views::predictive::{PredictiveOptions, PredictiveView, predictive};
pub use views::quality::{QualityView, quality};
pub use views::temporal::{TemporalOptions, TemporalView, TrendDirection, temporal};
pub use views::GroupStats;

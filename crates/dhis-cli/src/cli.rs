//! Command-line arguments of the dashboard viewer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use dhis_analysis::Period;
use dhis_client::SortOrder;
use dhis_export::ExportFormat;
use dhis_model::{RowFilter, ScopeFilter};

#[derive(Parser)]
#[command(
    name = "dhis2-viewer",
    version,
    about = "Browse, analyse and export DHIS2 dashboards from the terminal",
    long_about = "Browse, analyse and export DHIS2 dashboards from the terminal.\n\n\
                  Items without live data are filled with placeholder datasets so\n\
                  every item can be analysed and exported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: the platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and show the current user.
    Whoami(ConnectArgs),

    /// List dashboards visible to the current user.
    Dashboards(DashboardsArgs),

    /// Show the items of one dashboard.
    Items(DashboardArgs),

    /// Resolve an item and run analysis views on its data.
    Analyze(AnalyzeArgs),

    /// Export the data of one item.
    Export(ExportArgs),

    /// Export every item of a dashboard into one workbook.
    ExportAll(ExportAllArgs),

    /// Show the settings in effect, or write a default settings file.
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
pub struct ConnectArgs {
    /// DHIS2 base URL (overrides the settings file).
    #[arg(long = "url", env = "DHIS2_URL", value_name = "URL")]
    pub url: Option<String>,

    /// User name (overrides the settings file).
    #[arg(long = "username", short = 'u', env = "DHIS2_USERNAME")]
    pub username: Option<String>,

    /// Password; never stored in the settings file.
    #[arg(long = "password", env = "DHIS2_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Also query /api/analytics before using placeholder data.
    #[arg(long = "legacy-analytics")]
    pub legacy_analytics: bool,
}

#[derive(Args)]
pub struct DashboardsArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Which dashboards to list.
    #[arg(long = "scope", value_enum)]
    pub scope: Option<ScopeArg>,

    /// Case-insensitive name filter.
    #[arg(long = "search", short = 's')]
    pub search: Option<String>,

    /// Page number, from 1.
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Client-side ordering of the listed page.
    #[arg(long = "sort", value_enum)]
    pub sort: Option<SortArg>,
}

#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Dashboard identifier.
    #[arg(value_name = "DASHBOARD_ID")]
    pub dashboard: String,
}

#[derive(Args)]
pub struct ItemArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    /// Item position as shown by `items`, from 1.
    #[arg(long = "item", short = 'i', default_value_t = 1)]
    pub item: usize,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub target: ItemArgs,

    /// Views to run.
    #[arg(long = "view", value_enum, default_values_t = [ViewArg::Descriptive])]
    pub views: Vec<ViewArg>,

    /// Print the first ROWS rows as a polars data frame instead of the default sample.
    #[arg(long = "preview", value_name = "ROWS")]
    pub preview: Option<usize>,

    /// Keep only these columns, in this order.
    #[arg(long = "columns", value_delimiter = ',', value_name = "COL,...")]
    pub columns: Vec<String>,

    /// Keep rows whose COL is one of the values; repeatable.
    #[arg(long = "filter", value_name = "COL=V1,V2", value_parser = RowFilter::parse_one_of)]
    pub filters: Vec<RowFilter>,

    /// Keep rows whose numeric COL lies in MIN..MAX (inclusive); repeatable.
    #[arg(long = "range", value_name = "COL=MIN..MAX", value_parser = RowFilter::parse_range)]
    pub ranges: Vec<RowFilter>,

    /// Time column of the temporal view.
    #[arg(long = "time-column")]
    pub time_column: Option<String>,

    /// Numeric column analysed by the temporal, geographic and comparative views.
    #[arg(long = "value-column")]
    pub value_column: Option<String>,

    /// Categorical column of the descriptive and comparative views.
    #[arg(long = "category-column")]
    pub category_column: Option<String>,

    /// Place column of the geographic view.
    #[arg(long = "region-column")]
    pub region_column: Option<String>,

    /// Indicator of the performance view.
    #[arg(long = "indicator")]
    pub indicator: Option<String>,

    /// Independent variable of the predictive view.
    #[arg(long = "x")]
    pub x: Option<String>,

    /// Dependent variable of the predictive view.
    #[arg(long = "y")]
    pub y: Option<String>,

    /// Where to evaluate the fitted line (default: mean of X).
    #[arg(long = "predict-at", value_name = "X")]
    pub predict_at: Option<f64>,

    #[arg(long = "period", value_enum)]
    pub period: Option<PeriodArg>,

    /// Places shown by the geographic view (5-20).
    #[arg(long = "top")]
    pub top_n: Option<usize>,

    /// Performance thresholds as LOW,MID,HIGH.
    #[arg(long = "thresholds", value_name = "LOW,MID,HIGH", value_delimiter = ',')]
    pub thresholds: Option<Vec<i32>>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub target: ItemArgs,

    #[arg(long = "format", short = 'f', value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Output directory.
    #[arg(long = "output-dir", short = 'o', value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct ExportAllArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    /// Output directory.
    #[arg(long = "output-dir", short = 'o', value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default settings to the settings file.
    #[arg(long = "init")]
    pub init: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    All,
    Personal,
    Organization,
    Shared,
}

impl From<ScopeArg> for ScopeFilter {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => Self::All,
            ScopeArg::Personal => Self::Personal,
            ScopeArg::Organization => Self::Organization,
            ScopeArg::Shared => Self::Shared,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    NameAsc,
    NameDesc,
    CreatedDesc,
    ItemCountDesc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::NameAsc => Self::NameAsc,
            SortArg::NameDesc => Self::NameDesc,
            SortArg::CreatedDesc => Self::CreatedDesc,
            SortArg::ItemCountDesc => Self::ItemCountDesc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Daily => Self::Daily,
            PeriodArg::Weekly => Self::Weekly,
            PeriodArg::Monthly => Self::Monthly,
            PeriodArg::Quarterly => Self::Quarterly,
            PeriodArg::Yearly => Self::Yearly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::Xlsx => Self::Xlsx,
        }
    }
}

/// Analysis views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Descriptive,
    Temporal,
    Geographic,
    Performance,
    Comparative,
    Predictive,
    Quality,
    All,
}

impl ViewArg {
    pub const EACH: [Self; 7] = [
        Self::Descriptive,
        Self::Temporal,
        Self::Geographic,
        Self::Performance,
        Self::Comparative,
        Self::Predictive,
        Self::Quality,
    ];

    pub const fn title(&self) -> &'static str {
        match self {
            Self::Descriptive => "Analyse descriptive",
            Self::Temporal => "Analyse temporelle",
            Self::Geographic => "Analyse géographique",
            Self::Performance => "Analyse de performance",
            Self::Comparative => "Analyse comparative",
            Self::Predictive => "Analyse prédictive",
            Self::Quality => "Qualité des données",
            Self::All => "Toutes les analyses",
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

//! Subcommand implementations.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use tracing::{info, info_span, warn};

use dhis_analysis::{
    ComparativeOptions, DescriptiveOptions, GeographicOptions, PerformanceOptions,
    PredictiveOptions, RenderPrecondition, TemporalOptions, Thresholds,
};
use dhis_client::{
    AuthError, CatalogFilter, CatalogStats, ClientConfig, Dhis2Client, ResolvedItem,
    ResolverOptions, Session,
};
use dhis_export::{ExportFormat, export, export_workbook, write_export};
use dhis_cli::export_all::dashboard_tables;
use dhis_cli::render;
use dhis_cli::settings::{Settings, save_settings, settings_path};
use dhis_model::{Dashboard, ResolvedTable, TableFilter};

use crate::cli::{
    AnalyzeArgs, ConfigArgs, ConnectArgs, DashboardArgs, DashboardsArgs, ExportAllArgs,
    ExportArgs, ItemArgs, ViewArg,
};

/// Rows shown before the views when no `--preview` is asked for.
const SAMPLE_ROWS: usize = 5;

pub fn run_whoami(args: &ConnectArgs, settings: &Settings) -> Result<()> {
    let session = open_session(args, settings)?;
    println!("{}", render::user_table(session.user()));
    Ok(())
}

pub fn run_dashboards(args: &DashboardsArgs, settings: &Settings) -> Result<()> {
    let mut session = open_session(&args.connect, settings)?;
    let scope = args.scope.map_or(settings.catalog.scope, Into::into);
    let sort = args.sort.map_or(settings.catalog.sort, Into::into);
    let page_size = args.page_size.unwrap_or(settings.catalog.page_size);
    let filter = CatalogFilter::new(scope, args.search.clone());

    let listing = session.list_dashboards(&filter, args.page, page_size);
    if let Some(err) = &listing.warning {
        warn!("listing incomplete: {err}");
        eprintln!("Avertissement: liste incomplète ({err})");
    }
    let mut page = listing.page;
    sort.apply(&mut page.items);

    if page.items.is_empty() {
        println!("Aucun tableau de bord trouvé");
    } else {
        println!("{}", render::dashboards_table(&page));
        println!("{}", render::stats_line(&CatalogStats::from_dashboards(&page.items)));
    }
    println!("{}", render::page_footer(&page));
    Ok(())
}

pub fn run_items(args: &DashboardArgs, settings: &Settings) -> Result<()> {
    let mut session = open_session(&args.connect, settings)?;
    let dashboard = load_dashboard(&mut session, &args.dashboard)?;
    println!("{}", dashboard.name);
    if let Some(description) = dashboard.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    if dashboard.items.is_empty() {
        println!("Aucun élément dans ce tableau de bord");
    } else {
        println!("{}", render::items_table(&dashboard));
    }
    println!("{}", render::item_summary_line(&dashboard));
    Ok(())
}

pub fn run_analyze(args: &AnalyzeArgs, settings: &Settings) -> Result<()> {
    let mut session = open_session(&args.target.dashboard.connect, settings)?;
    let (_, resolved) = resolve_target(&mut session, &args.target)?;
    if let Some(values) = &args.thresholds
        && values.len() != 3
    {
        bail!("--thresholds attend trois valeurs (LOW,MID,HIGH)");
    }
    println!("{} [{}]", resolved.status, resolved.kind);
    let filter = TableFilter {
        columns: args.columns.clone(),
        rows: args.filters.iter().chain(&args.ranges).cloned().collect(),
    };
    let filtered;
    let table = if filter.is_empty() {
        &resolved.table
    } else {
        filtered = filter.apply(&resolved.table)?;
        println!(
            "Filtré: {} lignes sur {}",
            filtered.row_count(),
            resolved.table.row_count()
        );
        &filtered
    };

    match args.preview {
        Some(rows) => {
            let frame = table.to_dataframe().context("build data frame")?;
            println!("{}", frame.head(Some(rows)));
        }
        None => println!("{}", render::data_table(table, SAMPLE_ROWS)),
    }

    let views: Vec<ViewArg> = if args.views.contains(&ViewArg::All) {
        ViewArg::EACH.to_vec()
    } else {
        args.views.clone()
    };
    for view in views {
        println!();
        println!("== {} ==", view.title());
        match render_view(view, table, args, settings) {
            Ok(text) => println!("{text}"),
            Err(precondition) => println!("ℹ {precondition}"),
        }
    }
    Ok(())
}

fn render_view(
    view: ViewArg,
    table: &ResolvedTable,
    args: &AnalyzeArgs,
    settings: &Settings,
) -> Result<String, RenderPrecondition> {
    match view {
        ViewArg::Descriptive => {
            let options = DescriptiveOptions {
                numeric_column: args.value_column.clone(),
                categorical_column: args.category_column.clone(),
            };
            dhis_analysis::descriptive(table, &options).map(|v| render::descriptive(&v))
        }
        ViewArg::Temporal => {
            let options = TemporalOptions {
                time_column: args.time_column.clone(),
                value_column: args.value_column.clone(),
                period: args.period.map_or(settings.analysis.period, Into::into),
            };
            dhis_analysis::temporal(table, &options).map(|v| render::temporal(&v))
        }
        ViewArg::Geographic => {
            let options = GeographicOptions {
                region_column: args.region_column.clone(),
                value_column: args.value_column.clone(),
                top_n: args.top_n.unwrap_or(settings.analysis.top_n),
            };
            dhis_analysis::geographic(table, &options).map(|v| render::geographic(&v))
        }
        ViewArg::Performance => {
            let thresholds = match args.thresholds.as_deref() {
                Some(&[low, mid, high]) => Thresholds::new(low, mid, high),
                _ => settings.analysis.thresholds,
            };
            let options = PerformanceOptions {
                column: args.indicator.clone(),
                thresholds,
            };
            dhis_analysis::performance(table, &options).map(|v| render::performance(&v))
        }
        ViewArg::Comparative => {
            let options = ComparativeOptions {
                category_column: args.category_column.clone(),
                value_column: args.value_column.clone(),
            };
            dhis_analysis::comparative(table, &options).map(|v| render::comparative(&v))
        }
        ViewArg::Predictive => {
            let options = PredictiveOptions {
                x_column: args.x.clone(),
                y_column: args.y.clone(),
                input: args.predict_at,
            };
            dhis_analysis::predictive(table, &options).map(|v| render::predictive(&v))
        }
        ViewArg::Quality => Ok(render::quality(&dhis_analysis::quality(table))),
        ViewArg::All => Ok(String::new()),
    }
}

pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<()> {
    let mut session = open_session(&args.target.dashboard.connect, settings)?;
    let (name, resolved) = resolve_target(&mut session, &args.target)?;
    let format = ExportFormat::from(args.format);
    let bytes = export(&resolved.table, format)?;
    let produced = ExportFormat::sniff(&bytes);
    if produced != format {
        warn!(requested = %format, %produced, "export written in a fallback format");
    }
    let path = write_export(&args.output_dir, &name, &bytes)?;
    info!(path = %path.display(), "exported item");
    println!("Exporté: {}", path.display());
    Ok(())
}

pub fn run_export_all(args: &ExportAllArgs, settings: &Settings) -> Result<()> {
    let mut session = open_session(&args.dashboard.connect, settings)?;
    let dashboard = load_dashboard(&mut session, &args.dashboard.dashboard)?;
    if dashboard.items.is_empty() {
        bail!("Aucun élément à exporter");
    }

    let tables = dashboard_tables(session.client(), &dashboard);
    let bytes = export_workbook(&tables, Local::now().naive_local())?;
    if ExportFormat::sniff(&bytes) != ExportFormat::Xlsx {
        warn!("workbook could not be built, writing the summary as CSV");
    }
    let name = format!("{}_export_complet", dashboard.name);
    let path = write_export(&args.output_dir, &name, &bytes)?;
    info!(path = %path.display(), tables = tables.len(), "exported dashboard");
    println!(
        "Exporté: {} ({} élément(s))",
        path.display(),
        dashboard.items.len()
    );
    Ok(())
}

pub fn run_config(
    args: &ConfigArgs,
    explicit: Option<&std::path::Path>,
    settings: &Settings,
) -> Result<()> {
    let path = explicit
        .map(std::path::Path::to_path_buf)
        .or_else(settings_path);
    if args.init {
        let path = path.ok_or_else(|| anyhow!("no settings path for this platform"))?;
        save_settings(&path, &Settings::default())?;
        println!("Paramètres écrits dans {}", path.display());
        return Ok(());
    }
    match &path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (aucun fichier de paramètres)"),
    }
    print!("{}", toml::to_string_pretty(settings).context("serialize settings")?);
    Ok(())
}

/// Connection settings from flags first, then the settings file.
pub fn client_config(args: &ConnectArgs, settings: &Settings) -> Result<ClientConfig> {
    let base_url = args
        .url
        .clone()
        .unwrap_or_else(|| settings.server.base_url.clone());
    let Some(username) = args.username.clone().or_else(|| settings.server.username.clone())
    else {
        bail!("nom d'utilisateur manquant (--username ou DHIS2_USERNAME)");
    };
    let Some(password) = args.password.clone() else {
        bail!("mot de passe manquant (--password ou DHIS2_PASSWORD)");
    };
    let timeout = args
        .timeout_secs
        .map_or_else(|| settings.server.timeout(), std::time::Duration::from_secs);
    Ok(ClientConfig::new(base_url, username, password).with_timeout(timeout))
}

fn open_session(args: &ConnectArgs, settings: &Settings) -> Result<Session> {
    let config = client_config(args, settings)?;
    let options = ResolverOptions {
        legacy_analytics_fallback: args.legacy_analytics
            || settings.resolver.legacy_analytics_fallback,
    };
    let _span = info_span!("login", url = %config.trimmed_base_url()).entered();
    let client = Dhis2Client::new(&config)
        .map_err(login_error)?
        .with_options(options);
    Session::open(client).map_err(login_error)
}

fn login_error(err: AuthError) -> anyhow::Error {
    let message = err.user_message().to_string();
    anyhow::Error::new(err).context(message)
}

fn load_dashboard(session: &mut Session, id: &str) -> Result<Dashboard> {
    let dashboard = session
        .select_dashboard(id)
        .with_context(|| format!("tableau de bord {id} introuvable"))?;
    Ok(dashboard.clone())
}

/// The display name and resolved data of the item selected by `args`.
fn resolve_target(session: &mut Session, args: &ItemArgs) -> Result<(String, ResolvedItem)> {
    let dashboard = load_dashboard(session, &args.dashboard.dashboard)?;
    let count = dashboard.items.len();
    let item = args
        .item
        .checked_sub(1)
        .and_then(|idx| dashboard.items.get(idx))
        .ok_or_else(|| anyhow!("élément {} introuvable ({count} élément(s))", args.item))?;
    let name = item.display_name();
    let _span = info_span!("item", name = %name).entered();
    Ok((name, session.client().resolve_item(item)))
}

//! Terminal rendering of profiles, catalogs, tables and analysis views.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dhis_analysis::{
    Binning, ComparativeView, DescriptiveView, GeographicView, PerformanceView, PredictiveView,
    QualityView, TemporalView,
};
use dhis_client::CatalogStats;
use dhis_model::{Dashboard, PageResult, ResolvedTable, ShareScope, UserProfile};

pub const TABLE_WIDTH: u16 = 120;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH);
}

fn styled(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for index in columns {
        if let Some(column) = table.column_mut(*index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Two decimals, `-` when absent.
pub fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn scope_cell(scope: ShareScope) -> Cell {
    match scope {
        ShareScope::Personal => Cell::new("Personnel").fg(Color::Green),
        ShareScope::Organization => Cell::new("Organisation").fg(Color::Blue),
        ShareScope::Shared => Cell::new("Partagé"),
    }
}

pub fn user_table(user: &UserProfile) -> Table {
    let mut table = styled(&["Champ", "Valeur"]);
    table.add_row(vec![Cell::new("Id"), Cell::new(&user.id)]);
    table.add_row(vec![Cell::new("Nom"), Cell::new(&user.display_name)]);
    table.add_row(vec![
        Cell::new("Email"),
        user.email.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
    ]);
    let org = user
        .org_unit
        .as_ref()
        .map(|unit| unit.name.clone().unwrap_or_else(|| unit.id.clone()));
    table.add_row(vec![
        Cell::new("Unité d'organisation"),
        org.map_or_else(|| dim_cell("-"), Cell::new),
    ]);
    table
}

pub fn dashboards_table(page: &PageResult<Dashboard>) -> Table {
    let mut table = styled(&["Nom", "Portée", "Propriétaire", "Éléments", "Créé le", "Id"]);
    align_right(&mut table, &[3]);
    for dashboard in &page.items {
        let owner = dashboard
            .owner
            .as_ref()
            .and_then(|owner| owner.name.clone())
            .map_or_else(|| dim_cell("-"), Cell::new);
        table.add_row(vec![
            Cell::new(&dashboard.name).add_attribute(Attribute::Bold),
            scope_cell(dashboard.share_scope),
            owner,
            Cell::new(dashboard.items.len()),
            dashboard
                .created_date()
                .map_or_else(|| dim_cell("-"), Cell::new),
            dim_cell(&dashboard.id),
        ]);
    }
    table
}

pub fn page_footer<T>(page: &PageResult<T>) -> String {
    format!(
        "Page {}/{} - {} tableau(x) au total",
        page.page, page.total_pages, page.total
    )
}

pub fn stats_line(stats: &CatalogStats) -> String {
    format!(
        "{} tableau(x) affiché(s), dont {} personnel(s), {} élément(s)",
        stats.dashboards, stats.owned, stats.items
    )
}

pub fn items_table(dashboard: &Dashboard) -> Table {
    let mut table = styled(&["#", "Type", "Nom", "Id", "Données"]);
    align_right(&mut table, &[0]);
    for (idx, item) in dashboard.items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(item.kind().label()),
            Cell::new(item.display_name()),
            item.content_id().map_or_else(|| dim_cell("-"), Cell::new),
            if item.has_tabular_data() {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

pub fn item_summary_line(dashboard: &Dashboard) -> String {
    let summary = dashboard.item_summary();
    format!(
        "{} élément(s): {} visualisation(s), {} graphique(s), {} carte(s), {} texte(s), {} autre(s)",
        summary.total(),
        summary.visualizations,
        summary.charts,
        summary.maps,
        summary.texts,
        summary.others
    )
}

/// The first `limit` rows of `table`.
pub fn data_table(table: &ResolvedTable, limit: usize) -> Table {
    let names = table.column_names();
    let mut out = styled(&names);
    for row in table.rows().iter().take(limit) {
        out.add_row(
            row.iter()
                .map(|cell| {
                    if cell.is_missing() {
                        dim_cell("-")
                    } else {
                        Cell::new(cell.to_string())
                    }
                })
                .collect::<Vec<_>>(),
        );
    }
    out
}

pub fn descriptive(view: &DescriptiveView) -> String {
    let mut overview = styled(&["Indicateur", "Valeur"]);
    align_right(&mut overview, &[1]);
    overview.add_row(vec!["Lignes".to_string(), view.rows.to_string()]);
    overview.add_row(vec!["Colonnes".to_string(), view.columns.to_string()]);
    overview.add_row(vec!["Moyenne des moyennes".to_string(), number(view.mean_of_means)]);
    overview.add_row(vec![
        "Médiane des médianes".to_string(),
        number(view.median_of_medians),
    ]);
    overview.add_row(vec!["Écart-type moyen".to_string(), number(view.mean_std)]);
    overview.add_row(vec![
        "Valeurs manquantes".to_string(),
        format!("{} ({:.1}%)", view.missing, view.missing_ratio() * 100.0),
    ]);
    let mut out = vec![overview.to_string()];

    if let Some(distribution) = &view.distribution {
        let mut table = styled(&["Statistique", distribution.column.as_str()]);
        align_right(&mut table, &[1]);
        if let Some(summary) = &distribution.summary {
            for (label, value) in [
                ("count", Some(summary.count as f64)),
                ("mean", Some(summary.mean)),
                ("std", summary.std),
                ("min", Some(summary.min)),
                ("25%", Some(summary.q1)),
                ("50%", Some(summary.median)),
                ("75%", Some(summary.q3)),
                ("max", Some(summary.max)),
            ] {
                table.add_row(vec![label.to_string(), number(value)]);
            }
        }
        out.push(format!("Distribution de {}", distribution.column));
        out.push(table.to_string());
    }

    if let Some(frequencies) = &view.frequencies {
        let mut table = styled(&[frequencies.column.as_str(), "Effectif"]);
        align_right(&mut table, &[1]);
        for entry in &frequencies.counts {
            table.add_row(vec![entry.value.clone(), entry.count.to_string()]);
        }
        out.push(format!("Fréquences de {}", frequencies.column));
        out.push(table.to_string());
    }
    out.join("\n")
}

pub fn temporal(view: &TemporalView) -> String {
    let mut table = styled(&["Période", "Moyenne", "Somme", "Écart-type", "Nombre"]);
    align_right(&mut table, &[1, 2, 3, 4]);
    for period in &view.periods {
        table.add_row(vec![
            period.period.clone(),
            number(period.mean),
            number(Some(period.sum)),
            number(period.std),
            period.count.to_string(),
        ]);
    }
    let heading = match view.period {
        Some(period) => format!(
            "Évolution de {} par {} ({})",
            view.value_column,
            view.time_column,
            period.label()
        ),
        None => format!(
            "Évolution de {} par {} (valeurs brutes)",
            view.value_column, view.time_column
        ),
    };
    let mut out = vec![heading, table.to_string()];
    if let Some(trend) = &view.trend {
        out.push(format!(
            "{}: pente {:.2}, R² {:.3}",
            trend.direction.label(),
            trend.slope,
            trend.r_squared
        ));
    }
    out.join("\n")
}

pub fn geographic(view: &GeographicView) -> String {
    let mut table = styled(&[view.region_column.as_str(), "Somme", "Moyenne", "Écart-type", "Nombre"]);
    align_right(&mut table, &[1, 2, 3, 4]);
    for group in view.top() {
        table.add_row(vec![
            group.key.clone(),
            number(Some(group.sum)),
            number(group.mean),
            number(group.std),
            group.count.to_string(),
        ]);
    }
    format!(
        "Top {} par {} ({} zones)\n{table}",
        view.top_n,
        view.value_column,
        view.regions.len()
    )
}

pub fn performance(view: &PerformanceView) -> String {
    let mut table = styled(&["Niveau", "Nombre", "Pourcentage"]);
    align_right(&mut table, &[1, 2]);
    for band in &view.bands {
        table.add_row(vec![
            band.label.to_string(),
            band.count.to_string(),
            format!("{:.1}%", band.percentage),
        ]);
    }
    let method = match &view.binning {
        Binning::Thresholds { thresholds } => format!(
            "seuils {} / {} / {}",
            thresholds.low, thresholds.mid, thresholds.high
        ),
        Binning::Quartiles { .. } => "quartiles".to_string(),
    };
    let mut out = vec![
        format!("Performance de {} ({method})", view.column),
        table.to_string(),
    ];
    if view.unclassified > 0 {
        out.push(format!("{} valeur(s) hors de [0, 100]", view.unclassified));
    }
    if let Some(summary) = &view.summary {
        out.push(format!(
            "Moyenne {}, écart-type {}, médiane {}",
            number(Some(summary.mean)),
            number(summary.std),
            number(Some(summary.median))
        ));
    }
    out.join("\n")
}

pub fn comparative(view: &ComparativeView) -> String {
    let mut table = styled(&[
        view.category_column.as_str(),
        "Nombre",
        "Moyenne",
        "Écart-type",
        "Min",
        "Q1",
        "Médiane",
        "Q3",
        "Max",
    ]);
    align_right(&mut table, &[1, 2, 3, 4, 5, 6, 7, 8]);
    for group in &view.groups {
        let boxplot = group.boxplot;
        table.add_row(vec![
            group.stats.key.clone(),
            group.stats.count.to_string(),
            number(group.stats.mean),
            number(group.stats.std),
            number(group.stats.min),
            number(boxplot.map(|b| b.q1)),
            number(boxplot.map(|b| b.median)),
            number(boxplot.map(|b| b.q3)),
            number(group.stats.max),
        ]);
    }
    let mut out = vec![
        format!("{} par {}", view.value_column, view.category_column),
        table.to_string(),
    ];
    if let Some(anova) = &view.anova {
        let verdict = if anova.is_significant() {
            "différence significative"
        } else {
            "pas de différence significative"
        };
        out.push(format!(
            "ANOVA: F = {:.3}, p = {:.4} ({verdict})",
            anova.f_statistic, anova.p_value
        ));
    }
    out.join("\n")
}

pub fn predictive(view: &PredictiveView) -> String {
    let mut table = styled(&["Paramètre", "Valeur"]);
    align_right(&mut table, &[1]);
    for (label, value) in [
        ("Pente", view.regression.slope),
        ("Ordonnée à l'origine", view.regression.intercept),
        ("R²", view.r_squared),
        ("p-value", view.regression.p_value),
    ] {
        table.add_row(vec![label.to_string(), format!("{value:.4}")]);
    }
    format!(
        "{y} = {slope:.4} × {x} + {intercept:.4} ({rows} lignes)\n{table}\n\
         Prédiction pour {x} = {input:.2}: {prediction:.2}",
        y = view.y_column,
        x = view.x_column,
        slope = view.regression.slope,
        intercept = view.regression.intercept,
        rows = view.rows,
        input = view.input,
        prediction = view.prediction,
    )
}

pub fn quality(view: &QualityView) -> String {
    let mut table = styled(&["Indicateur", "Valeur"]);
    align_right(&mut table, &[1]);
    table.add_row(vec![
        "Valeurs manquantes".to_string(),
        format!("{} ({:.1}%)", view.missing_cells, view.missing_percentage),
    ]);
    table.add_row(vec!["Lignes dupliquées".to_string(), view.duplicate_rows.to_string()]);
    table.add_row(vec!["Colonnes numériques".to_string(), view.numeric_columns.to_string()]);
    table.add_row(vec!["Valeurs nulles (0)".to_string(), view.zero_cells.to_string()]);
    let mut out = vec![table.to_string()];
    if !view.missing_by_column.is_empty() {
        let mut missing = styled(&["Colonne", "Manquantes"]);
        align_right(&mut missing, &[1]);
        for column in &view.missing_by_column {
            missing.add_row(vec![column.column.clone(), column.missing.to_string()]);
        }
        out.push(missing.to_string());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use dhis_model::CellValue;

    use super::*;

    #[test]
    fn numbers_have_two_decimals() {
        assert_eq!(number(Some(1.0 / 3.0)), "0.33");
        assert_eq!(number(None), "-");
        assert_eq!(number(Some(f64::INFINITY)), "inf");
    }

    #[test]
    fn data_table_is_limited() {
        let table = ResolvedTable::from_rows(
            "t",
            ["Région", "Cas"],
            (0..30)
                .map(|idx| vec![CellValue::text(format!("R{idx}")), CellValue::Number(1.0)])
                .collect(),
        );
        let rendered = data_table(&table, 5);
        assert_eq!(rendered.row_iter().count(), 5);
        let text = rendered.to_string();
        assert!(text.contains("R4"));
        assert!(!text.contains("R5"));
    }

    #[test]
    fn quality_lists_missing_columns() {
        let table = ResolvedTable::from_rows(
            "t",
            ["Région", "Cas"],
            vec![vec![CellValue::text("Dakar"), CellValue::Missing]],
        );
        let text = quality(&dhis_analysis::quality(&table));
        assert!(text.contains("Lignes dupliquées"));
        assert!(text.contains("Manquantes"));
    }
}

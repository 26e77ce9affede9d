use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::{Chart, Plot, Shape};

use lotto_core::models::{MetricKind, Severity, StatsSnapshot};
use lotto_core::project::{ChartSeries, CombinedRow, DelayDetail, RankedListItem, StatsReport};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::VeryHigh => Color::Red,
        Severity::High => Color::Yellow,
        Severity::Medium => Color::Cyan,
        Severity::Low => Color::Green,
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_header(snapshot: &StatsSnapshot) {
    println!(
        "\n📊 Statistiche Lotto, aggiornate alle {}",
        snapshot.fetched_at.format("%d/%m/%Y %H:%M:%S")
    );
}

pub fn display_chart(series: &ChartSeries, metric: MetricKind) {
    let title = match metric {
        MetricKind::Frequency => "Frequenze Numeri",
        MetricKind::Delay => "Ritardi Numeri",
    };
    println!("\n── {} (top {}) ──", title, series.len());

    if series.is_empty() {
        println!("  (Nessun dato da mostrare)");
        return;
    }

    let points: Vec<(f32, f32)> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f32, v as f32))
        .collect();
    let y_max = series.values.iter().copied().max().unwrap_or(0).max(1) as f32;
    let x_max = series.len() as f32 + 1.0;

    let mut chart = Chart::new_with_y_range(160, 50, 0.0, x_max, 0.0, y_max * 1.1);
    println!("{}", chart.lineplot(&Shape::Bars(&points)));

    let legend = series
        .labels
        .iter()
        .enumerate()
        .map(|(i, n)| format!("{}:{}", i + 1, n))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  Posizione:numero  {legend}");
}

pub fn display_top(items: &[RankedListItem], metric: MetricKind) {
    println!("\n── Top {} per {} ──", items.len(), metric.label().to_lowercase());

    if items.is_empty() {
        println!("  (Nessun dato da mostrare)");
        return;
    }

    let mut table = new_table(vec!["#", "", "Numero", metric.label(), "Livello"]);
    for item in items {
        let color = severity_color(item.severity);
        table.add_row(vec![
            Cell::new(item.display_rank),
            Cell::new(item.medal),
            Cell::new(format!("{:2}", item.number)),
            Cell::new(item.value).fg(color),
            Cell::new(item.severity.label(metric)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_combined_table(rows: &[CombinedRow]) {
    println!("\n── Frequenze e ritardi ──");

    if rows.is_empty() {
        println!("  (Nessun dato da mostrare)");
        return;
    }

    let mut table = new_table(vec!["Numero", "Frequenza", "Ritardo", "Indice (rit. × 1,2)", "Trend"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(format!("{:2}", row.number)),
            Cell::new(row.frequency).fg(Color::Blue),
            Cell::new(row.delay).fg(Color::Yellow),
            Cell::new(row.derived_metric),
            Cell::new(row.trend),
        ]);
    }
    println!("{table}");
}

pub fn display_delay_detail(details: &[DelayDetail]) {
    println!("\n── Ritardi in dettaglio ──");

    if details.is_empty() {
        println!("  (Nessun dato da mostrare)");
        return;
    }

    let mut table = new_table(vec!["Numero", "Ritardo", "Stato"]);
    for d in details {
        let color = severity_color(d.severity);
        table.add_row(vec![
            Cell::new(format!("{:2}", d.number)),
            Cell::new(format!("{} estrazioni", d.delay)).fg(color),
            Cell::new(d.severity.label(MetricKind::Delay)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_report(report: &StatsReport) {
    display_chart(&report.chart, report.metric);
    display_top(&report.top, report.metric);
    display_combined_table(&report.table);
    display_delay_detail(&report.delays);
}

/// Transient notice for a failed refresh. The data already on screen stays.
pub fn display_refresh_error(err: &dyn std::fmt::Display, has_previous: bool) {
    if has_previous {
        eprintln!("⚠ Errore aggiornamento statistiche: {err} (restano visibili i dati precedenti)");
    } else {
        eprintln!("⚠ Errore aggiornamento statistiche: {err}");
    }
}

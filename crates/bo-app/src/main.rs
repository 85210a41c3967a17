//! Main application entry point

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bo_core::events::events::{FetchFailed, ReportLoaded};
use bo_core::events::{handler_from_fn, EventBus};
use bo_core::{DatePreset, DateRange, FilterCondition, SortConfig};
use bo_data::{CsvSource, DashboardConfig, FetchPhase};
use bo_views::{export_csv_file, ColumnLayout, Dashboard, ExportOptions, TableModel};

mod sample;

#[derive(Parser, Debug)]
#[command(name = "bid-optimizer")]
#[command(about = "Filter, sort and export campaign performance reports")]
#[command(version)]
struct Args {
    /// CSV export of daily campaign records
    #[arg(short, long, required_unless_present = "generate_sample")]
    data: Option<PathBuf>,

    /// Dashboard configuration (JSON)
    #[arg(short, long, env = "BO_CONFIG")]
    config: Option<PathBuf>,

    /// Advertising profile to report on
    #[arg(short, long)]
    profile: Option<String>,

    /// Date preset such as `last_7_days` or `this_month`
    #[arg(long, conflicts_with_all = ["start", "end"])]
    preset: Option<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// JSON array of filter conditions, or `@path` to read them from a file
    #[arg(short, long)]
    filters: Option<String>,

    /// Sort key with optional direction, e.g. `spend:desc`
    #[arg(short, long)]
    sort: Option<String>,

    /// Column layout saved from a previous session (JSON)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Override the configured fetch debounce, e.g. `150ms`
    #[arg(long, value_parser = humantime::parse_duration)]
    debounce: Option<Duration>,

    /// Only print the first N rows
    #[arg(long)]
    max_rows: Option<usize>,

    /// Write the visible table to this CSV file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write a sample CSV to this path and exit
    #[arg(long)]
    generate_sample: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let today = chrono::Local::now().date_naive();

    if let Some(path) = &args.generate_sample {
        let written = sample::write_sample_csv(path, "demo", today, 60)?;
        info!(path = %path.display(), records = written, "sample data written");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(debounce) = args.debounce {
        config.debounce = debounce;
    }
    config.validate()?;

    let data = args.data.clone().context("--data is required")?;
    let source = CsvSource::open(&data)
        .await
        .with_context(|| format!("reading {}", data.display()))?
        .with_null_config(config.null_values.clone());

    let events = Arc::new(EventBus::new());
    events.subscribe::<ReportLoaded>(handler_from_fn(|event| {
        if let Some(loaded) = event.as_any().downcast_ref::<ReportLoaded>() {
            info!(profile = %loaded.profile_id, campaigns = loaded.campaign_count, "report ready");
        }
    }));
    events.subscribe::<FetchFailed>(handler_from_fn(|event| {
        if let Some(failed) = event.as_any().downcast_ref::<FetchFailed>() {
            tracing::error!(profile = %failed.profile_id, "{}", failed.message);
        }
    }));

    let profile = args
        .profile
        .clone()
        .or_else(|| config.connections.first().map(|c| c.profile_id.clone()))
        .unwrap_or_else(|| "demo".to_string());

    let mut dashboard = Dashboard::new(config, Arc::new(source), events, today);
    configure(&mut dashboard, &args, today)?;
    dashboard.set_connection(&profile)?;

    let mut state = dashboard.subscribe();
    let phase = state
        .wait_for(|s| matches!(s.phase, FetchPhase::Succeeded | FetchPhase::Failed(_)))
        .await
        .context("fetch coordinator stopped")?
        .phase
        .clone();
    if let FetchPhase::Failed(message) = phase {
        bail!("report fetch failed: {message}");
    }

    if let Some(limit) = args.max_rows {
        dashboard.table_view_mut().config.max_rows_displayed = Some(limit);
    }
    let table = dashboard.table();
    print_table(&table)?;
    print_summary(&dashboard);

    if let Some(path) = &args.export {
        let written = export_csv_file(&table, path, &ExportOptions::default())
            .with_context(|| format!("exporting to {}", path.display()))?;
        info!(path = %path.display(), rows = written, "table exported");
    }

    Ok(())
}

/// Apply the range, filters, sort and layout flags
fn configure(dashboard: &mut Dashboard, args: &Args, today: chrono::NaiveDate) -> Result<()> {
    if let Some(name) = &args.preset {
        let preset =
            DatePreset::from_name(name).with_context(|| format!("unknown preset `{name}`"))?;
        dashboard.set_preset(preset, today);
    }
    if let (Some(start), Some(end)) = (&args.start, &args.end) {
        dashboard.set_date_range(DateRange::parse(start, end)?);
    }

    if let Some(raw) = &args.filters {
        let json = match raw.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
            None => raw.clone(),
        };
        let filters: Vec<FilterCondition> = serde_json::from_str(&json).context("parsing filters")?;
        dashboard.set_filters(filters)?;
    }

    if let Some(raw_sort) = &args.sort {
        let sort = SortConfig::parse(raw_sort)
            .with_context(|| format!("invalid sort `{raw_sort}`"))?;
        dashboard.set_sort(Some(sort));
    }

    if let Some(path) = &args.layout {
        *dashboard.layout_mut() = ColumnLayout::load(path)
            .with_context(|| format!("loading layout {}", path.display()))?;
    }
    Ok(())
}

fn print_table(table: &TableModel) -> Result<()> {
    let widths: Vec<usize> = table
        .columns()
        .enumerate()
        .map(|(index, column)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.cells.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let frozen = table.frozen.len();

    let header: Vec<String> = table
        .columns()
        .zip(widths.iter().copied())
        .map(|(column, width)| format!("{:<width$}", column.label))
        .collect();
    writeln!(out, "{}", join_sections(&header, frozen))?;

    for row in &table.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        writeln!(out, "{}", join_sections(&cells, frozen))?;
    }
    if table.truncated > 0 {
        writeln!(out, "... {} more rows", table.truncated)?;
    }
    Ok(())
}

/// Frozen cells, a `||` divider, then the scrollable cells
fn join_sections(cells: &[String], frozen: usize) -> String {
    let split = frozen.min(cells.len());
    let (left, right) = cells.split_at(split);
    format!("{} || {}", left.join(" | "), right.join(" | "))
}

fn print_summary(dashboard: &Dashboard) {
    let stats = dashboard.summary_stats();
    let totals = &stats.totals;
    println!();
    println!(
        "{} campaigns | spend ${:.2} | sales ${:.2} | ACOS {:.2}% | ROAS {:.2}",
        totals.campaigns, totals.spend, totals.sales, totals.acos, totals.roas
    );
    println!("range {}", dashboard.date_range());
}

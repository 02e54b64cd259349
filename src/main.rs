//! Bike Rental Dashboard - daily/hourly rental analytics
//!
//! Launches the interactive dashboard by default; `summary` and `export`
//! run headless over the same cached tables.

use anyhow::{Context, Result};
use bikeshare_dashboard::charts::StaticChartRenderer;
use bikeshare_dashboard::config::DashboardConfig;
use bikeshare_dashboard::data::{DataLoader, DataProcessor, DatasetCache, DateRange, RentalTables};
use bikeshare_dashboard::gui::DashboardApp;
use bikeshare_dashboard::stats::{
    CategoryMean, DashboardStats, HourlyAverage, Narrative, RentalSummary, StatsCalculator,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eframe::egui;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bikeshare-dashboard")]
#[command(about = "Bike rental analytics dashboard", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daily rentals CSV (overrides the config file)
    #[arg(long, global = true)]
    day: Option<PathBuf>,

    /// Hourly rentals CSV (overrides the config file)
    #[arg(long, global = true)]
    hour: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Gui,
    /// Print the dashboard figures for a date range
    Summary {
        /// First day, YYYY-MM-DD (default: first day in the data)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (default: last day in the data)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render the charts to PNG files
    Export {
        /// Directory to write the PNG files to
        #[arg(short, long, default_value = "charts")]
        out_dir: PathBuf,

        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    range: Option<DateRange>,
    summary: &'a RentalSummary,
    peak_hours: &'a [HourlyAverage],
    by_season: &'a [CategoryMean],
    by_weather: &'a [CategoryMean],
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(day) = cli.day {
        config.day_csv = day;
    }
    if let Some(hour) = cli.hour {
        config.hour_csv = hour;
    }

    let cache = Arc::new(DatasetCache::new(DataLoader::new(config.date_format.clone())));

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => run_gui(cache, config),
        Commands::Summary { start, end, json } => {
            let tables = cache
                .get_or_load(&config.sources())
                .context("Loading rental data")?;
            let (range, stats) = compute(&tables, &config, start, end)?;

            if json {
                let report = SummaryReport {
                    range,
                    summary: &stats.summary,
                    peak_hours: &stats.peak_hours,
                    by_season: &stats.by_season,
                    by_weather: &stats.by_weather,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(range, &stats);
                let narrative = Narrative::from_tables(&tables, config.peak_hours)?;
                println!();
                print!("{}", narrative.to_text());
            }
            Ok(())
        }
        Commands::Export {
            out_dir,
            start,
            end,
        } => {
            let tables = cache
                .get_or_load(&config.sources())
                .context("Loading rental data")?;
            let (range, stats) = compute(&tables, &config, start, end)?;
            let files = StaticChartRenderer::export_dashboard(
                &out_dir,
                &stats,
                (config.export_width, config.export_height),
            )?;
            info!(range = ?range, files = files.len(), "Export finished");
            for file in files {
                println!("{}", file.display());
            }
            Ok(())
        }
    }
}

fn run_gui(cache: Arc<DatasetCache>, config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Bike Rental Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Rental Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, cache, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}

/// Resolve the requested range against the data span and compute the figures.
fn compute(
    tables: &RentalTables,
    config: &DashboardConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Option<DateRange>, DashboardStats)> {
    let view = DataProcessor::select(tables, start, end)?;
    let stats = StatsCalculator::compute_dashboard(&view, config.histogram_bins, config.peak_hours)?;
    Ok((view.range, stats))
}

fn print_summary(range: Option<DateRange>, stats: &DashboardStats) {
    let summary = &stats.summary;
    match range {
        Some(range) => println!("Showing data from {} to {}", range.start, range.end),
        None => println!("No dates in the daily table"),
    }
    println!(
        "Total rentals:         {}",
        StatsCalculator::format_count(summary.total)
    );
    if summary.mean.is_nan() {
        println!("Average daily rentals: -");
    } else {
        println!("Average daily rentals: {:.2}", summary.mean);
    }
    match summary.max {
        Some(max) => println!("Busiest day:           {}", StatsCalculator::format_count(max)),
        None => println!("Busiest day:           -"),
    }

    println!();
    println!("Peak rental hours:");
    for (i, peak) in stats.peak_hours.iter().enumerate() {
        println!("  {}. {:02}:00 -> {:.2} rentals/hour", i + 1, peak.hour, peak.mean);
    }

    println!();
    println!("Average daily rentals by season:");
    for m in &stats.by_season {
        println!("  {:<16} {:>10.2}", m.label, m.mean);
    }
    println!("Average daily rentals by weather:");
    for m in &stats.by_weather {
        println!("  {:<16} {:>10.2}", m.label, m.mean);
    }
}

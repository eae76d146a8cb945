use crate::config::Config;
use crate::geos::{ReferenceLayers, SystemClock};
use crate::pipeline::{Pipeline, PipelineOutput, Variant};
use crate::progress::LogProgress;
use crate::source::ListingSource;
use crate::spreadsheets::{export_deals_xlsx, save_deals_csv, DealRow};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod domain;
mod errors;
mod geos;
mod pipeline;
mod progress;
mod source;
mod spreadsheets;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Run {
    Development,
    Apartment,
    Both,
}

/// Fetch active listings, enrich them with zoning and coastal distance, and
/// rank the cheapest deals per unit.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Which ranking to produce.
    #[arg(value_enum)]
    run: Run,

    /// Directory for the CSV (and XLSX) outputs.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Also write an .xlsx workbook next to each CSV.
    #[arg(long)]
    xlsx: bool,

    /// Keep at most this many ranked rows (never more than 750).
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("deal_scout=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let mut settings = config.pipeline_settings()?;
    if let Some(limit) = cli.limit {
        settings.limit = limit;
    }

    let source =
        ListingSource::new(config.source_settings()).context("Failed to build HTTP client")?;
    let layers = Arc::new(ReferenceLayers::new(
        config.layer_sources(),
        config.layer_ttl(),
        Arc::new(SystemClock),
        reqwest::blocking::Client::new(),
    ));
    let pipeline = Pipeline::new(source, layers, settings);
    let settings = pipeline.settings();
    tracing::info!(
        run = ?cli.run,
        limit = settings.limit,
        page_size = settings.page_size,
        zone_codes = settings.densities.len(),
        communities = settings.communities.len(),
        utm = settings.utm.epsg(),
        "starting"
    );

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("Failed to create output directory {}", cli.out.display()))?;

    match cli.run {
        Run::Development => development(&pipeline, &cli)?,
        Run::Apartment => apartment(&pipeline, &cli)?,
        Run::Both => std::thread::scope(|s| -> anyhow::Result<()> {
            let dev = s.spawn(|| development(&pipeline, &cli));
            let apt = s.spawn(|| apartment(&pipeline, &cli));

            let dev = dev.join().map_err(|_| anyhow::anyhow!("development run panicked"))?;
            let apt = apt.join().map_err(|_| anyhow::anyhow!("apartment run panicked"))?;
            dev.and(apt)
        })?,
    }

    Ok(())
}

fn development(pipeline: &Pipeline, cli: &Cli) -> anyhow::Result<()> {
    let mut progress = LogProgress::new(Variant::Development.label());
    let output = pipeline
        .run_development(&mut progress)
        .context("Development run failed")?;
    write_outputs(&output, &cli.out, "development_deals", "Development", cli.xlsx)
}

fn apartment(pipeline: &Pipeline, cli: &Cli) -> anyhow::Result<()> {
    let mut progress = LogProgress::new(Variant::Apartment.label());
    let output = pipeline
        .run_apartment(&mut progress)
        .context("Apartment run failed")?;
    write_outputs(&output, &cli.out, "apartment_deals", "Apartments", cli.xlsx)
}

fn write_outputs<T: DealRow>(
    output: &PipelineOutput<T>,
    dir: &Path,
    stem: &str,
    sheet: &str,
    xlsx: bool,
) -> anyhow::Result<()> {
    let rows = &output.ranking.rows;

    let csv_path = dir.join(format!("{stem}.csv"));
    save_deals_csv(&csv_path, rows)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    if xlsx {
        let xlsx_path = dir.join(format!("{stem}.xlsx"));
        let bytes = export_deals_xlsx(rows, sheet)?;
        std::fs::write(&xlsx_path, bytes)
            .with_context(|| format!("Failed to write {}", xlsx_path.display()))?;
    }

    tracing::info!(
        variant = %output.report.variant,
        shown = rows.len(),
        total = output.ranking.total_matches,
        file = %csv_path.display(),
        "showing top {} of {} matches",
        rows.len(),
        output.ranking.total_matches
    );
    Ok(())
}

// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressIterator};
use std::io;
use std::time::Instant;
use swim_trends::analyzer::AggregationIndex;
use swim_trends::cli::{Args, RenderConfig};
use swim_trends::records::collect_records;
use swim_trends::renderer::render_report;
use swim_trends::source::{self, JsonMeetParser};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swim_trends=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let start_time = Instant::now();
    let config = RenderConfig::from(&args);
    config.validate().context("invalid arguments")?;

    let parser = JsonMeetParser;
    let files = source::discover(&args.dir, &parser)
        .with_context(|| format!("searching {}", args.dir.display()))?;
    info!("Found {} meet files under {}", files.len(), args.dir.display());

    let bar = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(files.len() as u64) };
    let records = collect_records(source::load_meets(&files, &parser).progress_with(bar))
        .context("reading meet files")?;
    let index = AggregationIndex::build(&records);
    info!(
        "Analysis finished in {:.2?}. {} records, {} swimmers, {} dates.",
        start_time.elapsed(),
        index.record_count(),
        index.swimmers().count(),
        index.axis().len()
    );

    let render_start = Instant::now();
    let summary = render_report(&index, &config).context("rendering report")?;
    info!(
        "Rendering finished in {:.2?}: {} swimmer charts, {} event charts, {} animations.",
        render_start.elapsed(),
        summary.swimmer_charts,
        summary.event_charts,
        summary.animations
    );

    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

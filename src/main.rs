//! RfmForge: customer segmentation by RFM quartile scoring
//!
//! Entry point: loads transactions, runs the segmentation pipeline, prints
//! the summary tables, renders charts and optionally exports CSV tables.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rfmforge::{data, pipeline, viz, Args};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .init();

    run_pipeline(&args)
}

/// Load, segment, report
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load transactions
    info!(input = %args.input.display(), "loading transactions");
    let records = data::load_transactions(&args.input, &args.column_mapping())
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    // Step 2: Aggregate, score, label and profile
    let segment_start = Instant::now();
    let report = pipeline::run(&records).context("RFM segmentation failed")?;
    debug!(elapsed_ms = segment_start.elapsed().as_millis() as u64, "segmentation finished");

    println!(
        "✓ Segmented {} customers into {} segments",
        report.customer_count(),
        report.profiles.len()
    );

    // Step 3: Console tables
    viz::print_report(&report, args.tail);

    // Step 4: Charts
    if !args.no_charts {
        viz::generate_segment_charts(&report, &args.output)?;
        println!("\nSegment count chart saved to: {}", args.output);
        println!("Segment means chart saved to: {}", viz::means_chart_path(&args.output));
    }

    // Step 5: Export
    if let Some(dir) = &args.export_dir {
        data::export_report(&report, dir)
            .with_context(|| format!("failed to export to {}", dir.display()))?;
        println!("Tables exported to: {}", dir.display());
    }

    info!(elapsed_s = start_time.elapsed().as_secs_f64(), "pipeline complete");
    Ok(())
}

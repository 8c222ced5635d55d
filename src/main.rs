mod engine;
mod loader;
mod models;
mod processing;
mod report;

use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Write};
use std::process::exit;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::PipelineEngine;
use crate::processing::RateTable;

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: If I was making a much more sophisticated CLI application, I would have used the clap crate
    //      to handle the CLI parsing and execution.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: transaction-etl-engine [input].csv [log_level:optional] [summary_file:optional] > [output].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args.get(2)
        .map(|s| parse_log_level(s)).unwrap_or(LevelFilter::ERROR);
    let summary_path = args.get(3);

    setup_logging(log_level);

    let engine = PipelineEngine::new(RateTable::builtin());

    let timer = Instant::now();
    let outcome = engine.run(path).await?;
    let duration = timer.elapsed();

    report::log_summary(&outcome.aggregation);

    let throughput = outcome.aggregation.total_records as f64 / duration.as_secs_f64().max(f64::EPSILON);
    info!(
        "Processed {} transactions in {duration:?} ({throughput:.0} records/second)",
        outcome.aggregation.total_records
    );

    if let Some(summary_path) = summary_path {
        let mut summary_file = BufWriter::new(File::create(summary_path)?);
        report::write_summary(&outcome.aggregation, &mut summary_file)?;
        summary_file.flush()?;
        info!("Summary report written to {summary_path}");
    }

    //NOTE: The processed rows go to stdout so the caller decides where they land;
    //      logging stays on stderr to keep redirection clean.
    let mut output = BufWriter::new(stdout().lock());
    report::write_processed_csv(&outcome.records, &mut output)?;
    output.flush()?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

use std::time::{Duration, Instant};

use tokio::task::spawn_blocking;
use tracing::info;

use crate::loader::CsvLoader;
use crate::models::Transaction;
use crate::processing::{aggregate, deduplicate, AggregationResult, Converter, RateTable, Validator};

/// Wall-clock durations recorded for each pipeline stage and for the run as
/// a whole.
#[derive(Debug, Clone, Copy)]
pub struct StageTimings {
    pub dedup: Duration,
    pub validation: Duration,
    pub conversion: Duration,
    pub aggregation: Duration,
    pub total: Duration
}

/// Everything a completed run produces: the processed record sequence for
/// row-level export, the aggregate analytics, and the stage timings.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub records: Vec<Transaction>,
    pub aggregation: AggregationResult,
    pub timings: StageTimings
}

/// Sequences the pipeline stages over one batch of records.
///
/// The engine owns stage ordering and timing and nothing else; every piece
/// of business logic lives in the stage it belongs to. Stages run strictly
/// one after another, each consuming the full output of the previous one;
/// parallelism only ever happens inside a stage.
pub struct PipelineEngine {
    validator: Validator,
    converter: Converter
}

impl PipelineEngine {
    pub fn new(rates: RateTable) -> Self {
        Self {
            validator: Validator::new(rates.clone()),
            converter: Converter::new(rates)
        }
    }

    /// Overrides the worker count used by the parallel stages.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.validator = self.validator.with_workers(workers);
        self.converter = self.converter.with_workers(workers);
        self
    }

    /// Loads the CSV at `path` and runs the full pipeline over it.
    ///
    /// A load failure aborts the run before any stage executes; the caller
    /// receives the error and nothing is emitted for the failed run.
    pub async fn run(&self, path: &str) -> anyhow::Result<PipelineOutcome> {
        let path = path.to_string();
        let records = spawn_blocking(move || CsvLoader::new().load(&path)).await??;

        Ok(self.run_records(records).await)
    }

    /// Runs deduplication, validation, conversion, and aggregation over
    /// records that are already in memory.
    pub async fn run_records(&self, records: Vec<Transaction>) -> PipelineOutcome {
        let overall = Instant::now();

        let timer = Instant::now();
        let deduplicated = deduplicate(records);
        let dedup = timer.elapsed();

        let timer = Instant::now();
        let validated = self.validator.validate(deduplicated).await;
        let validation = timer.elapsed();

        let timer = Instant::now();
        let converted = self.converter.convert(validated).await;
        let conversion = timer.elapsed();

        let timer = Instant::now();
        let aggregation = aggregate(&converted);

        let timings = StageTimings {
            dedup,
            validation,
            conversion,
            aggregation: timer.elapsed(),
            total: overall.elapsed()
        };

        info!(
            "Stage timings: dedup {:?}, validation {:?}, conversion {:?}, aggregation {:?}, total {:?}",
            timings.dedup, timings.validation, timings.conversion, timings.aggregation, timings.total
        );

        PipelineOutcome {
            records: converted,
            aggregation,
            timings
        }
    }
}

use std::thread::available_parallelism;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::Transaction;
use crate::processing::RateTable;

/// Converts source-currency amounts into the base currency.
///
/// Conversion is pure per-record arithmetic against an immutable rate table,
/// so the batch is split into one chunk per worker and the chunks run
/// concurrently. Reassembling the chunks in submission order keeps the
/// output readable for row-level reports, although nothing downstream
/// depends on it.
pub struct Converter {
    rates: RateTable,
    workers: usize
}

impl Converter {
    pub fn new(rates: RateTable) -> Self {
        let workers = available_parallelism().map(|count| count.get()).unwrap_or(1);

        Self { rates, workers }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Converts every record, preserving input order.
    ///
    /// A chunk task that dies is logged and its records pass through
    /// unconverted; one bad task must not sink the batch.
    pub async fn convert(&self, records: Vec<Transaction>) -> Vec<Transaction> {
        let total = records.len();

        if total == 0 {
            return records;
        }

        info!("Transforming {} transactions", total);

        let timer = Instant::now();
        let chunk_size = total.div_ceil(self.workers);
        let mut handles: Vec<(JoinHandle<Vec<Transaction>>, Vec<Transaction>)> = Vec::new();
        let mut remaining = records;

        while !remaining.is_empty() {
            let rest = remaining.split_off(chunk_size.min(remaining.len()));
            let chunk = remaining;
            remaining = rest;

            let rates = self.rates.clone();
            let fallback = chunk.clone();

            let handle = tokio::spawn(async move {
                chunk
                    .into_iter()
                    .map(|record| convert_single(record, &rates))
                    .collect()
            });

            handles.push((handle, fallback));
        }

        let mut converted = Vec::with_capacity(total);

        for (handle, fallback) in handles {
            match handle.await {
                Ok(chunk) => converted.extend(chunk),
                Err(join_error) => {
                    error!("Conversion task failed, {} records pass through unconverted: {join_error}", fallback.len());
                    converted.extend(fallback);
                }
            }
        }

        info!("Transformation complete in {:?}", timer.elapsed());

        converted
    }
}

/// Multiplies the source amount by the currency's rate against the base
/// currency. Records with no amount stay unconverted; they can only be
/// invalid ones and never reach the aggregate sums.
fn convert_single(record: Transaction, rates: &RateTable) -> Transaction {
    let rate = rates.rate_for(&record.currency);
    let converted_amount = record.amount.map(|amount| amount * rate);

    record.with_converted_amount(converted_amount)
}

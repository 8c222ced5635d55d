use std::sync::Arc;
use std::thread::available_parallelism;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::Transaction;
use crate::processing::RateTable;

const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

const VALID_MESSAGE: &str = "Valid";
const TASK_FAILURE_MESSAGE: &str = "Validation task failed";

/// Applies the validation rule set to every record across a bounded pool of
/// worker tasks.
///
/// Rule evaluation is independent per record, so the only ordering guarantee
/// that matters is that the output sequence matches the input sequence. That
/// is enforced by awaiting the join handles in submission order rather than
/// completion order.
pub struct Validator {
    rates: RateTable,
    workers: usize
}

impl Validator {
    /// Creates a validator defaulting to one worker per available core.
    pub fn new(rates: RateTable) -> Self {
        let workers = available_parallelism().map(|count| count.get()).unwrap_or(1);

        Self { rates, workers }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Validates every record, preserving input length and order.
    ///
    /// The wall-clock reference for the future-timestamp rule is captured
    /// once at stage start, so every record in the batch is judged against
    /// the same instant. The semaphore is created per invocation and fully
    /// drained before this method returns; no worker outlives the stage.
    ///
    /// A task that dies takes down only its own record: the record is kept
    /// in the output, marked invalid with a generic message, and the batch
    /// continues.
    pub async fn validate(&self, records: Vec<Transaction>) -> Vec<Transaction> {
        let total = records.len();

        info!("Validating {} transactions using {} workers", total, self.workers);

        let timer = Instant::now();
        let reference_time = Local::now().naive_local();
        let pool = Arc::new(Semaphore::new(self.workers));
        let mut handles: Vec<(JoinHandle<Transaction>, Transaction)> = Vec::with_capacity(total);

        for record in records {
            let permits = pool.clone();
            let rates = self.rates.clone();
            let fallback = record.clone();

            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                validate_single(record, &rates, reference_time)
            });

            handles.push((handle, fallback));
        }

        let mut validated = Vec::with_capacity(total);

        for (handle, fallback) in handles {
            match handle.await {
                Ok(record) => validated.push(record),
                Err(join_error) => {
                    error!(
                        "Validation task for transaction [{}] failed: {join_error}",
                        fallback.transaction_id
                    );
                    validated.push(fallback.with_verdict(false, TASK_FAILURE_MESSAGE.to_string()));
                }
            }
        }

        let valid_count = validated.iter().filter(|record| record.is_valid).count();

        info!(
            "Validation complete: {} valid out of {} in {:?}",
            valid_count,
            total,
            timer.elapsed()
        );

        validated
    }
}

/// Evaluates the full rule set against one record.
///
/// Every rule runs; all failures are concatenated into the message so a
/// defective record reports everything wrong with it at once.
fn validate_single(record: Transaction, rates: &RateTable, reference_time: NaiveDateTime) -> Transaction {
    let mut failures: Vec<&str> = Vec::new();

    if record.transaction_id.trim().is_empty() {
        failures.push("Missing transaction ID");
    }

    if record.account_id.trim().is_empty() {
        failures.push("Missing account ID");
    }

    match record.amount {
        None => failures.push("Missing amount"),
        Some(amount) if amount < Decimal::ZERO => failures.push("Negative amount"),
        Some(amount) if amount > MAX_AMOUNT => failures.push("Amount exceeds maximum limit"),
        Some(_) => {}
    }

    if !rates.supports(&record.currency) {
        failures.push("Invalid or unsupported currency");
    }

    match record.timestamp {
        None => failures.push("Missing timestamp"),
        Some(timestamp) if timestamp > reference_time => failures.push("Future timestamp not allowed"),
        Some(_) => {}
    }

    if failures.is_empty() {
        record.with_verdict(true, VALID_MESSAGE.to_string())
    } else {
        record.with_verdict(false, failures.join("; "))
    }
}

use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};

use crate::loader::LoaderError;
use crate::models::Transaction;

const PROGRESS_LOG_INTERVAL: usize = 1000;

/// Buffered CSV reader for raw transaction rows.
///
/// A row that fails to decode is logged and skipped so one bad line cannot
/// poison an otherwise healthy batch; a file that cannot be opened at all is
/// a batch-fatal error and propagates to the caller.
pub struct CsvLoader;

impl CsvLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads every parseable row from the file at `path`, in file order.
    pub fn load(&self, path: &str) -> Result<Vec<Transaction>, LoaderError> {
        info!("Loading transactions from CSV file: {path}");

        let timer = Instant::now();
        let mut reader = self.open_reader(path)?;
        let mut records = Vec::new();

        for (row, result) in reader.deserialize::<Transaction>().enumerate() {
            match result {
                Ok(record) => {
                    records.push(record);

                    if records.len() % PROGRESS_LOG_INTERVAL == 0 {
                        debug!("Loaded {} records", records.len());
                    }
                }
                Err(error) => {
                    // Row 0 sits on line 2: one for the header, one for 1-basing.
                    warn!("Failed to parse record at line {}: {error}", row + 2);
                }
            }
        }

        info!("Successfully loaded {} transactions in {:?}", records.len(), timer.elapsed());

        Ok(records)
    }

    /// Loads at most `limit` parseable rows, skipping the first `offset`
    /// rows of the file.
    pub fn load_batch(&self, path: &str, offset: usize, limit: usize) -> Result<Vec<Transaction>, LoaderError> {
        info!("Loading batch from CSV: offset={offset}, limit={limit}");

        let mut reader = self.open_reader(path)?;
        let mut records = Vec::with_capacity(limit);

        for result in reader.deserialize::<Transaction>().skip(offset) {
            if records.len() >= limit {
                break;
            }

            match result {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!("Failed to parse record: {error}");
                }
            }
        }

        info!("Loaded batch of {} transactions", records.len());

        Ok(records)
    }

    fn open_reader(&self, path: &str) -> Result<csv::Reader<BufReader<File>>, LoaderError> {
        let file = File::open(path)?;

        Ok(ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file)))
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashSet;

use tracing::info;

use crate::models::Transaction;

/// Removes records sharing a `transaction_id`, keeping the first occurrence
/// and the original relative order of the survivors.
///
/// Pure over its input; an empty batch yields an empty batch. The number of
/// dropped records is logged for telemetry.
pub fn deduplicate(records: Vec<Transaction>) -> Vec<Transaction> {
    let incoming = records.len();
    let mut seen = HashSet::with_capacity(incoming);

    let unique: Vec<Transaction> = records
        .into_iter()
        .filter(|record| seen.insert(record.transaction_id.clone()))
        .collect();

    info!("Removed {} duplicate transactions", incoming - unique.len());

    unique
}

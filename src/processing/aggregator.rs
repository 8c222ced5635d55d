use std::collections::HashMap;
use std::time::Instant;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use crate::models::{AccountId, Transaction, TransactionType};

/// Computed analytics for one pipeline run. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    /// Size of the aggregated input, before the validity filter.
    pub total_records: usize,
    /// Records that passed validation.
    pub valid_records: usize,
    /// Exact sum of the base-currency amounts over the valid subset.
    pub total_amount: Decimal,
    /// `total_amount / valid_records`, half-up to 2 fractional digits; zero
    /// when there are no valid records.
    pub average_amount: Decimal,
    pub count_by_type: HashMap<TransactionType, u64>,
    pub amount_by_account: HashMap<AccountId, Decimal>
}

/// Reduces a record set into grouped counts and exact-decimal sums.
///
/// Only records that passed validation contribute to the analytics;
/// `total_records` reports the size of the input slice. Sums use decimal
/// addition with no intermediate rounding, so the result is the same
/// whatever order the records arrive in.
pub fn aggregate(records: &[Transaction]) -> AggregationResult {
    info!("Aggregating {} transactions", records.len());

    let timer = Instant::now();

    let mut valid_records = 0usize;
    let mut total_amount = Decimal::ZERO;
    let mut count_by_type: HashMap<TransactionType, u64> = HashMap::new();
    let mut amount_by_account: HashMap<AccountId, Decimal> = HashMap::new();

    for record in records.iter().filter(|record| record.is_valid) {
        let converted_amount = record.converted_amount.unwrap_or(Decimal::ZERO);

        valid_records += 1;
        total_amount += converted_amount;
        *count_by_type.entry(record.transaction_type).or_insert(0) += 1;
        *amount_by_account.entry(record.account_id.clone()).or_insert(Decimal::ZERO) += converted_amount;
    }

    let average_amount = if valid_records == 0 {
        Decimal::ZERO
    } else {
        (total_amount / Decimal::from(valid_records as u64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    info!("Aggregation complete in {:?}", timer.elapsed());

    AggregationResult {
        total_records: records.len(),
        valid_records,
        total_amount,
        average_amount,
        count_by_type,
        amount_by_account
    }
}

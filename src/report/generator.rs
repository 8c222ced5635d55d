use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use tracing::info;

use crate::models::{Transaction, TIMESTAMP_FORMAT};
use crate::processing::AggregationResult;
use crate::report::ReportError;

const RULE_WIDTH: usize = 60;
const TOP_ACCOUNT_LIMIT: usize = 10;

/// Logs the run summary at info level for console consumption.
pub fn log_summary(result: &AggregationResult) {
    let rule = "=".repeat(RULE_WIDTH);
    let divider = "-".repeat(RULE_WIDTH);

    info!("{rule}");
    info!("TRANSACTION SUMMARY REPORT");
    info!("{rule}");
    info!("Total Records: {}", result.total_records);
    info!("Valid Records: {} ({:.2}%)", result.valid_records, valid_percentage(result));
    info!("Invalid Records: {}", result.total_records - result.valid_records);
    info!("{divider}");
    info!("Total Amount (USD): ${}", result.total_amount);
    info!("Average Amount (USD): ${}", result.average_amount);
    info!("{divider}");
    info!("Transactions by Type:");

    for (transaction_type, count) in counts_by_type_name(result) {
        info!("  {transaction_type}: {count}");
    }

    info!("{divider}");
    info!("Top {TOP_ACCOUNT_LIMIT} Accounts by Volume:");

    for (account_id, amount) in top_accounts(result) {
        info!("  {account_id}: ${amount}");
    }

    info!("{rule}");
}

/// Writes the row-level export of processed records, verdicts and
/// base-currency amounts included.
pub fn write_processed_csv<W: Write>(records: &[Transaction], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = Writer::from_writer(writer);

    csv_writer.write_record([
        "transaction_id",
        "account_id",
        "timestamp",
        "amount",
        "currency",
        "type",
        "category",
        "description",
        "status",
        "converted_amount_usd",
        "is_valid",
        "validation_message"
    ])?;

    for record in records {
        let row = [
            record.transaction_id.clone(),
            record.account_id.clone(),
            record
                .timestamp
                .map(|timestamp| timestamp.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            record.amount.map(|amount| amount.to_string()).unwrap_or_default(),
            record.currency.clone(),
            record.transaction_type.to_string(),
            record.category.clone().unwrap_or_default(),
            record.description.clone().unwrap_or_default(),
            record.status.to_string(),
            record
                .converted_amount
                .map(|amount| amount.to_string())
                .unwrap_or_default(),
            record.is_valid.to_string(),
            record.validation_message.clone().unwrap_or_default()
        ];

        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;

    Ok(())
}

/// Writes the text summary report.
pub fn write_summary<W: Write>(result: &AggregationResult, mut writer: W) -> Result<(), ReportError> {
    let rule = "=".repeat(RULE_WIDTH);
    let divider = "-".repeat(RULE_WIDTH);

    writeln!(writer, "TRANSACTION PROCESSING ENGINE")?;
    writeln!(writer, "Summary Report")?;
    writeln!(writer, "{rule}")?;
    writeln!(writer)?;
    writeln!(writer, "OVERVIEW")?;
    writeln!(writer, "{divider}")?;
    writeln!(writer, "Total Records: {}", result.total_records)?;
    writeln!(writer, "Valid Records: {} ({:.2}%)", result.valid_records, valid_percentage(result))?;
    writeln!(writer, "Invalid Records: {}", result.total_records - result.valid_records)?;
    writeln!(writer)?;
    writeln!(writer, "FINANCIAL METRICS")?;
    writeln!(writer, "{divider}")?;
    writeln!(writer, "Total Transaction Volume (USD): ${}", result.total_amount)?;
    writeln!(writer, "Average Transaction Size (USD): ${}", result.average_amount)?;
    writeln!(writer)?;
    writeln!(writer, "DISTRIBUTION BY TRANSACTION TYPE")?;
    writeln!(writer, "{divider}")?;

    for (transaction_type, count) in counts_by_type_name(result) {
        writeln!(writer, "{transaction_type}: {count}")?;
    }

    writeln!(writer)?;
    writeln!(writer, "{rule}")?;

    Ok(())
}

fn valid_percentage(result: &AggregationResult) -> f64 {
    if result.total_records == 0 {
        return 0.0;
    }

    (result.valid_records as f64 * 100.0) / result.total_records as f64
}

fn counts_by_type_name(result: &AggregationResult) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = result
        .count_by_type
        .iter()
        .map(|(transaction_type, count)| (transaction_type.to_string(), *count))
        .collect();

    counts.sort();

    counts
}

fn top_accounts(result: &AggregationResult) -> Vec<(&str, Decimal)> {
    let mut accounts: Vec<(&str, Decimal)> = result
        .amount_by_account
        .iter()
        .map(|(account_id, amount)| (account_id.as_str(), *amount))
        .collect();

    accounts.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
    accounts.truncate(TOP_ACCOUNT_LIMIT);

    accounts
}

use super::{write_processed_csv, write_summary};

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::models::{Transaction, TransactionType, TIMESTAMP_FORMAT};
use crate::processing::AggregationResult;

fn create_result() -> Result<AggregationResult> {
    Ok(AggregationResult {
        total_records: 4,
        valid_records: 3,
        total_amount: Decimal::from_str("258.00")?,
        average_amount: Decimal::from_str("86.00")?,
        count_by_type: HashMap::from([(TransactionType::Debit, 2), (TransactionType::Credit, 1)]),
        amount_by_account: HashMap::from([
            ("ACC001".to_string(), Decimal::from_str("150.00")?),
            ("ACC002".to_string(), Decimal::from_str("108.00")?)
        ])
    })
}

#[test]
fn test_processed_csv_report_contains_header_and_verdict_columns() -> Result<()> {
    let record = Transaction::new(
        "TXN0001".to_string(),
        "ACC001".to_string(),
        Some(NaiveDateTime::parse_from_str("2025-06-01 09:15:00", TIMESTAMP_FORMAT)?),
        Some(Decimal::from_str("100.00")?),
        "EUR".to_string(),
        TransactionType::Debit
    )
    .with_category("PURCHASE".to_string())
    .with_verdict(true, "Valid".to_string())
    .with_converted_amount(Some(Decimal::from_str("108.00")?));

    let mut buffer = Vec::new();
    write_processed_csv(&[record], &mut buffer)?;
    let output = String::from_utf8(buffer)?;
    let mut lines = output.lines();

    assert_eq!(
        lines.next(),
        Some("transaction_id,account_id,timestamp,amount,currency,type,category,description,status,converted_amount_usd,is_valid,validation_message")
    );
    assert_eq!(
        lines.next(),
        Some("TXN0001,ACC001,2025-06-01 09:15:00,100.00,EUR,DEBIT,PURCHASE,,COMPLETED,108.00,true,Valid")
    );
    assert_eq!(lines.next(), None);

    Ok(())
}

#[test]
fn test_processed_csv_report_leaves_absent_fields_blank() -> Result<()> {
    let record = Transaction::new(
        "TXN0002".to_string(),
        "ACC001".to_string(),
        None,
        None,
        "USD".to_string(),
        TransactionType::Fee
    )
    .with_verdict(false, "Missing amount; Missing timestamp".to_string());

    let mut buffer = Vec::new();
    write_processed_csv(&[record], &mut buffer)?;
    let output = String::from_utf8(buffer)?;

    assert!(output.contains("TXN0002,ACC001,,,USD,FEE,,,COMPLETED,,false,Missing amount; Missing timestamp"));

    Ok(())
}

#[test]
fn test_summary_report_contains_overview_and_distribution() -> Result<()> {
    let mut buffer = Vec::new();
    write_summary(&create_result()?, &mut buffer)?;
    let output = String::from_utf8(buffer)?;

    assert!(output.contains("Total Records: 4"));
    assert!(output.contains("Valid Records: 3 (75.00%)"));
    assert!(output.contains("Invalid Records: 1"));
    assert!(output.contains("Total Transaction Volume (USD): $258.00"));
    assert!(output.contains("Average Transaction Size (USD): $86.00"));
    assert!(output.contains("CREDIT: 1"));
    assert!(output.contains("DEBIT: 2"));

    Ok(())
}

#[test]
fn test_summary_report_handles_an_empty_run() -> Result<()> {
    let result = AggregationResult {
        total_records: 0,
        valid_records: 0,
        total_amount: Decimal::ZERO,
        average_amount: Decimal::ZERO,
        count_by_type: HashMap::new(),
        amount_by_account: HashMap::new()
    };

    let mut buffer = Vec::new();
    write_summary(&result, &mut buffer)?;
    let output = String::from_utf8(buffer)?;

    assert!(output.contains("Total Records: 0"));
    assert!(output.contains("Valid Records: 0 (0.00%)"));

    Ok(())
}

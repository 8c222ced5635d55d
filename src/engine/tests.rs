use super::PipelineEngine;

use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime};
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use crate::models::{Transaction, TransactionType};
use crate::processing::RateTable;

fn past_timestamp() -> NaiveDateTime {
    Local::now().naive_local() - Duration::days(1)
}

fn create_record(
    transaction_id: &str,
    account_id: &str,
    amount: Option<&str>,
    currency: &str,
    timestamp: Option<NaiveDateTime>,
    transaction_type: TransactionType
) -> Result<Transaction> {
    Ok(Transaction::new(
        transaction_id.to_string(),
        account_id.to_string(),
        timestamp,
        match amount {
            Some(raw) => Some(Decimal::from_str(raw)?),
            None => None
        },
        currency.to_string(),
        transaction_type
    ))
}

#[tokio::test]
async fn test_pipeline_processes_a_batch_end_to_end() -> Result<()> {
    // 5 raw records: one duplicate ID, one missing amount, one future
    // timestamp, two fully valid.
    let records = vec![
        create_record("TXN0001", "ACC001", Some("100.00"), "USD", Some(past_timestamp()), TransactionType::Debit)?,
        create_record("TXN0002", "ACC001", Some("50.00"), "USD", Some(past_timestamp()), TransactionType::Credit)?,
        create_record("TXN0001", "ACC002", Some("100.00"), "USD", Some(past_timestamp()), TransactionType::Debit)?,
        create_record("TXN0003", "ACC002", None, "USD", Some(past_timestamp()), TransactionType::Fee)?,
        create_record("TXN0004", "ACC003", Some("10.00"), "USD", Some(Local::now().naive_local() + Duration::days(7)), TransactionType::Debit)?
    ];

    let engine = PipelineEngine::new(RateTable::builtin()).with_workers(2);
    let outcome = engine.run_records(records).await;

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.aggregation.total_records, 4);
    assert_eq!(outcome.aggregation.valid_records, 2);
    assert_eq!(outcome.aggregation.total_amount, Decimal::from_str("150.00")?);

    Ok(())
}

#[tokio::test]
async fn test_pipeline_runs_from_a_csv_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;

    writeln!(file, "transaction_id,account_id,timestamp,amount,currency,type,category,description,status")?;
    writeln!(file, "TXN0001,ACC001,2025-06-01 09:15:00,100.00,USD,DEBIT,PURCHASE,Online purchase,COMPLETED")?;
    writeln!(file, "TXN0002,ACC002,2025-06-02 10:30:00,100.00,EUR,CREDIT,SALARY,Direct deposit,COMPLETED")?;
    writeln!(file, "TXN0003,ACC002,2025-06-03 11:00:00,25.00,XXX,FEE,FEE,Fee charge,COMPLETED")?;

    let engine = PipelineEngine::new(RateTable::builtin()).with_workers(2);
    let outcome = engine.run(file.path().to_str().unwrap()).await?;

    assert_eq!(outcome.aggregation.total_records, 3);
    assert_eq!(outcome.aggregation.valid_records, 2);
    assert_eq!(outcome.aggregation.total_amount, Decimal::from_str("208.00")?);
    // Invalid records still acquire a numeric base-currency amount.
    assert_eq!(outcome.records[2].converted_amount, Some(Decimal::from_str("25.00")?));

    Ok(())
}

#[tokio::test]
async fn test_pipeline_aborts_when_the_input_cannot_be_read() {
    let engine = PipelineEngine::new(RateTable::builtin());

    assert!(engine.run("missing.csv").await.is_err());
}

#[tokio::test]
async fn test_pipeline_records_stage_timings() -> Result<()> {
    let records = vec![
        create_record("TXN0001", "ACC001", Some("100.00"), "USD", Some(past_timestamp()), TransactionType::Debit)?
    ];

    let engine = PipelineEngine::new(RateTable::builtin()).with_workers(1);
    let outcome = engine.run_records(records).await;

    assert!(outcome.timings.total >= outcome.timings.dedup);
    assert!(outcome.timings.total >= outcome.timings.validation);
    assert!(outcome.timings.total >= outcome.timings.conversion);
    assert!(outcome.timings.total >= outcome.timings.aggregation);

    Ok(())
}

#[tokio::test]
async fn test_pipeline_handles_an_empty_batch() {
    let engine = PipelineEngine::new(RateTable::builtin());
    let outcome = engine.run_records(Vec::new()).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.aggregation.total_records, 0);
    assert_eq!(outcome.aggregation.valid_records, 0);
    assert_eq!(outcome.aggregation.average_amount, Decimal::ZERO);
}

use std::env;
use std::fs::{create_dir_all, File};
use std::io::{self, stdout, BufWriter, Write};
use std::path::Path;

use chrono::{Duration, Local, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;

const PROBABILITY_INVALID: f64 = 0.05;
const DUPLICATE_SHARE: f64 = 0.02;

const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "CNY"];
const TRANSACTION_TYPES: [&str; 6] = ["DEBIT", "CREDIT", "TRANSFER", "FEE", "DIVIDEND", "INTEREST"];
const CATEGORIES: [&str; 10] = [
    "SALARY", "PURCHASE", "TRANSFER", "INVESTMENT", "FEE",
    "DIVIDEND", "INTEREST", "REFUND", "PAYMENT", "WITHDRAWAL"
];
const STATUSES: [&str; 4] = ["COMPLETED", "PENDING", "FAILED", "REVERSED"];
const DESCRIPTIONS: [&str; 10] = [
    "Regular monthly payment",
    "Online purchase",
    "ATM withdrawal",
    "Wire transfer",
    "Direct deposit",
    "Card payment",
    "Investment transaction",
    "Fee charge",
    "Interest payment",
    "Dividend payment"
];

struct GeneratorConfig {
    num_records: usize,
    num_accounts: usize,
    output_path: String
}

impl GeneratorConfig {
    fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();
        let num_records = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100_000);
        let num_accounts = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(500);

        Self {
            num_records,
            num_accounts,
            output_path: "samples/generated.csv".to_string()
        }
    }
}

fn main() -> io::Result<()> {
    let config = GeneratorConfig::from_args();

    println!(
        "Generating {} transactions for {} accounts in {}...",
        config.num_records, config.num_accounts, config.output_path
    );

    if let Some(parent) = Path::new(&config.output_path).parent() {
        create_dir_all(parent)?;
    }

    let file = File::create(&config.output_path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "transaction_id,account_id,timestamp,amount,currency,type,category,description,status")?;

    let mut rng = rand::thread_rng();
    let base_time = Local::now().naive_local();
    let mut rows: Vec<String> = Vec::with_capacity(config.num_records);

    for index in 1..=config.num_records {
        let row = if rng.gen_bool(PROBABILITY_INVALID) {
            generate_invalid_row(&mut rng, index, base_time, config.num_accounts)
        } else {
            generate_valid_row(&mut rng, index, base_time, config.num_accounts)
        };

        rows.push(row);

        if index % 10_000 == 0 {
            print!(".");
            stdout().flush()?;
        }
    }

    let num_duplicates = (config.num_records as f64 * DUPLICATE_SHARE) as usize;
    for _ in 0..num_duplicates {
        let duplicate = rows[rng.gen_range(0..config.num_records)].clone();
        rows.push(duplicate);
    }

    for row in &rows {
        writeln!(writer, "{row}")?;
    }

    println!("\nGeneration complete: {} rows ({} duplicates)", rows.len(), num_duplicates);

    Ok(())
}

fn generate_transaction_id(base_time: NaiveDateTime, index: usize) -> String {
    format!("TXN{}{:08}", base_time.format("%Y%m%d"), index)
}

fn generate_account_id<R: Rng>(rng: &mut R, num_accounts: usize) -> String {
    format!("ACC{:03}", rng.gen_range(1..=num_accounts))
}

fn generate_past_timestamp<R: Rng>(rng: &mut R, base_time: NaiveDateTime) -> String {
    let offset = Duration::days(rng.gen_range(0..90))
        + Duration::hours(rng.gen_range(0..24))
        + Duration::minutes(rng.gen_range(0..60))
        + Duration::seconds(rng.gen_range(0..60));

    (base_time - offset).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Skews amounts towards small transactions: 70% small, 20% medium, 10% large.
fn generate_amount<R: Rng>(rng: &mut R) -> String {
    let roll: f64 = rng.r#gen();

    let amount = if roll < 0.7 {
        rng.gen_range(10.0..1000.0)
    } else if roll < 0.9 {
        rng.gen_range(1000.0..10000.0)
    } else {
        rng.gen_range(10000.0..100000.0)
    };

    format!("{amount:.2}")
}

fn generate_valid_row<R: Rng>(rng: &mut R, index: usize, base_time: NaiveDateTime, num_accounts: usize) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{}",
        generate_transaction_id(base_time, index),
        generate_account_id(rng, num_accounts),
        generate_past_timestamp(rng, base_time),
        generate_amount(rng),
        CURRENCIES.choose(rng).unwrap(),
        TRANSACTION_TYPES.choose(rng).unwrap(),
        CATEGORIES.choose(rng).unwrap(),
        DESCRIPTIONS.choose(rng).unwrap(),
        STATUSES.choose(rng).unwrap()
    )
}

/// Produces a row violating exactly one validation rule so generated files
/// exercise every failure path.
fn generate_invalid_row<R: Rng>(rng: &mut R, index: usize, base_time: NaiveDateTime, num_accounts: usize) -> String {
    let defects = ["missing_id", "missing_account", "negative_amount", "future_date", "invalid_currency"];

    let transaction_id = generate_transaction_id(base_time, index);
    let account_id = generate_account_id(rng, num_accounts);
    let timestamp = generate_past_timestamp(rng, base_time);
    let amount = generate_amount(rng);
    let currency = CURRENCIES.choose(rng).unwrap();
    let transaction_type = TRANSACTION_TYPES.choose(rng).unwrap();
    let category = CATEGORIES.choose(rng).unwrap();
    let description = DESCRIPTIONS.choose(rng).unwrap();
    let status = STATUSES.choose(rng).unwrap();

    match *defects.choose(rng).unwrap() {
        "missing_id" => format!(
            ",{account_id},{timestamp},{amount},{currency},{transaction_type},{category},{description},{status}"
        ),
        "missing_account" => format!(
            "{transaction_id},,{timestamp},{amount},{currency},{transaction_type},{category},{description},{status}"
        ),
        "negative_amount" => format!(
            "{transaction_id},{account_id},{timestamp},-{amount},{currency},{transaction_type},{category},{description},{status}"
        ),
        "future_date" => {
            let future = (base_time + Duration::days(rng.gen_range(1..30))).format("%Y-%m-%d %H:%M:%S");
            format!(
                "{transaction_id},{account_id},{future},{amount},{currency},{transaction_type},{category},{description},{status}"
            )
        }
        _ => format!(
            "{transaction_id},{account_id},{timestamp},{amount},XXX,{transaction_type},{category},{description},{status}"
        )
    }
}

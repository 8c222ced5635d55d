use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};

use crate::models::{AccountId, TransactionId, TransactionStatus, TransactionType};

/// Wire format for transaction timestamps, shared by the loader and the
/// report exporter.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a single financial transaction moving through the pipeline.
///
/// The core fields are fixed when the record is constructed (or decoded from
/// a CSV row) and never change afterwards. The derived fields are written
/// exactly once each by their pipeline stage, always by producing a new
/// record value rather than mutating shared state.
///
/// Required fields may still be blank or absent at this point. Deciding
/// whether a record is well-formed is the validation stage's job, so the
/// model has to be able to carry defective rows.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// Globally unique identifier; the sole identity for equality and dedup.
    pub transaction_id: TransactionId,
    /// The account this transaction belongs to.
    pub account_id: AccountId,
    /// When the transaction occurred.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    /// The transacted amount in the source currency.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<Decimal>,
    /// Three-letter code of the source currency.
    pub currency: String,
    /// The kind of operation (debit, credit, transfer, etc.)
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: TransactionStatus,
    /// Amount expressed in the base currency; set by the conversion stage.
    #[serde(skip)]
    pub converted_amount: Option<Decimal>,
    /// Verdict of the validation stage.
    #[serde(skip)]
    pub is_valid: bool,
    /// Human-readable validation outcome; "Valid" or the joined failure
    /// reasons.
    #[serde(skip)]
    pub validation_message: Option<String>
}

impl Transaction {
    /// Creates a record from its core fields.
    ///
    /// Optional attributes default to absent and `status` to completed; the
    /// derived fields start unset until their stage runs.
    pub fn new(
        transaction_id: TransactionId,
        account_id: AccountId,
        timestamp: Option<NaiveDateTime>,
        amount: Option<Decimal>,
        currency: String,
        transaction_type: TransactionType
    ) -> Self {
        Self {
            transaction_id,
            account_id,
            timestamp,
            amount,
            currency,
            transaction_type,
            category: None,
            description: None,
            status: TransactionStatus::default(),
            converted_amount: None,
            is_valid: false,
            validation_message: None
        }
    }

    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the record with its validation verdict populated.
    pub fn with_verdict(mut self, is_valid: bool, message: String) -> Self {
        self.is_valid = is_valid;
        self.validation_message = Some(message);
        self
    }

    /// Returns the record with its base-currency amount populated.
    pub fn with_converted_amount(mut self, converted_amount: Option<Decimal>) -> Self {
        self.converted_amount = converted_amount;
        self
    }
}

//NOTE: Two records are the same transaction iff their IDs match; every
//      set or map keyed by record relies on this.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.transaction_id == other.transaction_id
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transaction_id.hash(state);
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => Decimal::from_str(raw.trim())
            .map(Some)
            .map_err(de::Error::custom)
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(de::Error::custom)
    }
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<TransactionStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();

    match raw.trim().to_uppercase().as_str() {
        "" => Ok(TransactionStatus::default()),
        "PENDING" => Ok(TransactionStatus::Pending),
        "COMPLETED" => Ok(TransactionStatus::Completed),
        "FAILED" => Ok(TransactionStatus::Failed),
        "REVERSED" => Ok(TransactionStatus::Reversed),
        other => Err(de::Error::custom(format!("unknown transaction status: {other}")))
    }
}

mod record;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::Deserialize;

pub use record::{Transaction, TIMESTAMP_FORMAT};

pub type AccountId = String;
pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
    Transfer,
    Fee,
    Dividend,
    Interest
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Fee => "FEE",
            TransactionType::Dividend => "DIVIDEND",
            TransactionType::Interest => "INTEREST"
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Completed,
    Failed,
    Reversed
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Reversed => "REVERSED"
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

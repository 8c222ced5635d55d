use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report error: {0}")]
    Io(#[from] io::Error),
    #[error("Report error: {0}")]
    Csv(#[from] csv::Error)
}

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Loader error: {0}")]
    Io(#[from] io::Error),
    #[error("Loader error: {0}")]
    Csv(#[from] csv::Error)
}

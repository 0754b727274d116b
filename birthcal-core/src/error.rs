//! Error types for birthcal.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while building or reading a birthday calendar.
#[derive(Error, Debug)]
pub enum BirthcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unsupported language code '{0}'")]
    UnknownLanguage(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for birthcal operations.
pub type BirthcalResult<T> = Result<T, BirthcalError>;

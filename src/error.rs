use reqwest::StatusCode;
use thiserror::Error;

/// Page-level failure of a scrape cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    Status(StatusCode),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} must be positive")]
    NotPositive(String),
}

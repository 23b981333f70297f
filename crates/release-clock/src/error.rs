//! Error types for release-clock operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid events document: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, ClockError>;

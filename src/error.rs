//! Error types for loan loading and input checks
//!
//! The simulator itself never fails; these errors come from the edges
//! (reading CSV/JSON inputs, rejecting out-of-range extra payments).

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias for loader and input-check operations
pub type LoanResult<T> = Result<T, LoanError>;

/// Errors raised while loading or checking loan inputs
#[derive(Error, Debug)]
pub enum LoanError {
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Event row with a type other than Payment, RateChange or Disbursement
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Extra payment outside the simulated window
    #[error("Extra payment dated {date} falls outside the simulation window [{start}, {end}]")]
    ExtraPaymentOutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
}

//! Booking engine error types.

use innkeep_core::error::InnkeepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("check-out must be after check-in")]
    InvalidDateRange,

    #[error("guest count must be at least 1")]
    NoGuests,

    #[error("cannot modify a {status} booking")]
    NotModifiable { status: String },
}

impl From<BookingError> for InnkeepError {
    fn from(err: BookingError) -> Self {
        InnkeepError::Validation {
            message: err.to_string(),
        }
    }
}

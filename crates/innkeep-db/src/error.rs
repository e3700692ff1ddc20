//! Database-specific error types and conversions.

use innkeep_core::error::InnkeepError;
use uuid::Uuid;

/// Marker thrown by the conflict-guarded booking insert when the
/// in-transaction overlap re-check finds a competing booking.
pub(crate) const BOOKING_CONFLICT: &str = "booking_conflict";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The transactional overlap re-check rejected the insert.
    #[error("Booking conflict for accommodation {accommodation_id}")]
    Conflict { accommodation_id: Uuid },
}

impl From<DbError> for InnkeepError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => InnkeepError::NotFound { entity, id },
            DbError::Conflict { accommodation_id } => {
                InnkeepError::NotAvailable { accommodation_id }
            }
            other => InnkeepError::Database(other.to_string()),
        }
    }
}

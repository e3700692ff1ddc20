//! Error types for the Innkeep booking core.
//!
//! Domain conflicts (`NotAvailable`, `CapacityExceeded`,
//! `AccommodationNotBookable`) are expected and retryable by the caller
//! after changing parameters. Integrity violations
//! (`CrossEstablishmentRelationship`, `CodeAllocationExhausted`) indicate
//! a client bypassing intended flows or systemic contention and are
//! logged loudly where they occur. `AccessDenied` deliberately carries no
//! tenant identifiers — audit detail goes to the log, not the caller.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InnkeepError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Accommodation {accommodation_id} is not available for the requested range")]
    NotAvailable { accommodation_id: Uuid },

    #[error("Guest count {requested} exceeds accommodation capacity {max}")]
    CapacityExceeded { requested: u32, max: u32 },

    #[error("Accommodation cannot be booked while {status}")]
    AccommodationNotBookable { status: String },

    #[error("Invalid booking status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// The booking's establishment and the accommodation's owner differ.
    /// A hard integrity error, never a soft warning.
    #[error("Accommodation belongs to a different establishment")]
    CrossEstablishmentRelationship {
        accommodation_establishment: Uuid,
        requested: Uuid,
    },

    #[error("Booking code allocation exhausted after {attempts} attempts")]
    CodeAllocationExhausted { attempts: u32 },

    #[error("Access denied")]
    AccessDenied,

    /// A restricted role with no home establishment — a broken account
    /// setup that should alert operators, not a normal denial.
    #[error("Scope configuration error: restricted role {role} has no home establishment")]
    ScopeConfiguration { role: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InnkeepResult<T> = Result<T, InnkeepError>;

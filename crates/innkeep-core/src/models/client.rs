//! Client domain model.
//!
//! A client is a guest identity keyed by email, looked up or created
//! as a side effect of booking creation. Aggregate stats are folded in
//! when a booking completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    /// Lookup key; unique across the platform.
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Booking history, most recent last.
    pub booking_ids: Vec<Uuid>,
    pub total_stays: u32,
    /// Lifetime spend in minor currency units.
    pub total_spent: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

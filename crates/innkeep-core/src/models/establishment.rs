//! Establishment domain model.
//!
//! An establishment is an independently operated property under the
//! platform's tenant boundary. Every accommodation and booking is
//! scoped to exactly one establishment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default billing mode seeded onto new accommodations of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMode {
    Nightly,
    Monthly,
}

impl PricingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PricingMode::Nightly => "Nightly",
            PricingMode::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe unique identifier (e.g. `lakeside-lodge`).
    pub slug: String,
    /// Deactivated establishments stop accepting bookings but are
    /// never hard-deleted.
    pub active: bool,
    /// Total guest capacity across all accommodations.
    pub total_capacity: u32,
    pub pricing_mode: PricingMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to onboard a new establishment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEstablishment {
    pub name: String,
    pub slug: String,
    pub total_capacity: u32,
    pub pricing_mode: PricingMode,
}

/// Fields that can be updated on an existing establishment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEstablishment {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub active: Option<bool>,
    pub total_capacity: Option<u32>,
    pub pricing_mode: Option<PricingMode>,
}

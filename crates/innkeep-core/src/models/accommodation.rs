//! Accommodation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of bookable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccommodationKind {
    Room,
    Suite,
    House,
    Apartment,
}

impl AccommodationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccommodationKind::Room => "Room",
            AccommodationKind::Suite => "Suite",
            AccommodationKind::House => "House",
            AccommodationKind::Apartment => "Apartment",
        }
    }
}

/// Occupancy status. All transitions flow through the booking
/// lifecycle service — no other component writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccommodationStatus {
    Available,
    Reserved,
    Occupied,
    Maintenance,
}

impl AccommodationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccommodationStatus::Available => "Available",
            AccommodationStatus::Reserved => "Reserved",
            AccommodationStatus::Occupied => "Occupied",
            AccommodationStatus::Maintenance => "Maintenance",
        }
    }
}

/// How a stay in a unit is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingMode {
    Nightly,
    Monthly,
    Hourly,
}

impl BillingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingMode::Nightly => "Nightly",
            BillingMode::Monthly => "Monthly",
            BillingMode::Hourly => "Hourly",
        }
    }
}

/// Rate card for a unit. Prices are integer minor units of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    pub base_price: i64,
    /// In-season override; takes precedence over `base_price` when set.
    pub seasonal_price: Option<i64>,
    /// ISO 4217 code (e.g. `BIF`).
    pub currency: String,
    pub billing_mode: BillingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accommodation {
    pub id: Uuid,
    /// Owning establishment. Immutable once set.
    pub establishment_id: Uuid,
    pub name: String,
    pub kind: AccommodationKind,
    /// Maximum number of guests.
    pub max_guests: u32,
    pub rate: RateCard,
    pub status: AccommodationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new accommodation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccommodation {
    pub establishment_id: Uuid,
    pub name: String,
    pub kind: AccommodationKind,
    pub max_guests: u32,
    pub rate: RateCard,
}

/// Fields that can be updated on an existing accommodation.
///
/// Status is deliberately absent — it moves via
/// `AccommodationRepository::set_status`, driven by the lifecycle
/// service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccommodation {
    pub name: Option<String>,
    pub kind: Option<AccommodationKind>,
    pub max_guests: Option<u32>,
    pub rate: Option<RateCard>,
}

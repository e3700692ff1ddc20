//! Booking domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::accommodation::BillingMode;

/// How the reservation was made. Walk-ins follow different
/// availability and pricing rules than standard bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingKind {
    Online,
    Onsite,
    WalkIn,
}

impl BookingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingKind::Online => "Online",
            BookingKind::Onsite => "Onsite",
            BookingKind::WalkIn => "WalkIn",
        }
    }
}

/// Booking lifecycle state.
///
/// `Pending -> Confirmed -> Completed`, with `Cancelled` reachable
/// from `Pending` and `Confirmed`. No transitions leave `Completed`
/// or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether a booking in this status still holds its accommodation
    /// and participates in availability conflicts.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// State machine edge check.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Paid => "Paid",
        }
    }
}

/// Deterministic price computation stored on the booking at creation.
///
/// `total` equals `subtotal` — discounts and taxes are applied
/// downstream by invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub mode: BillingMode,
    pub unit_price: i64,
    pub quantity: i64,
    pub subtotal: i64,
    pub total: i64,
    pub currency: String,
}

/// Contact details of the booking guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable code (e.g. `BK-0601-X7Q`). Unique, immutable
    /// after creation.
    pub code: String,
    /// Denormalized copy of the accommodation's owner; enforced equal
    /// to it at creation.
    pub establishment_id: Uuid,
    pub accommodation_id: Uuid,
    pub client_id: Uuid,
    pub kind: BookingKind,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: u32,
    pub contact: GuestContact,
    /// Names of accompanying guests, if recorded.
    pub companions: Vec<String>,
    pub pricing: PricingBreakdown,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository-level insert input. The lifecycle service resolves
/// `code`, `establishment_id`, `client_id` and `pricing` before
/// persisting; new bookings always start `Pending`/`Unpaid`.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub code: String,
    pub establishment_id: Uuid,
    pub accommodation_id: Uuid,
    pub client_id: Uuid,
    pub kind: BookingKind,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: u32,
    pub contact: GuestContact,
    pub companions: Vec<String>,
    pub pricing: PricingBreakdown,
}

/// Repository-level patch for update-in-place.
#[derive(Debug, Clone, Default)]
pub struct UpdateBooking {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub guests: Option<u32>,
    pub contact: Option<GuestContact>,
    pub companions: Option<Vec<String>>,
    pub payment_status: Option<PaymentStatus>,
    /// Recomputed breakdown when the date range changed.
    pub pricing: Option<PricingBreakdown>,
}

/// Bounds of the calendar day containing `instant`:
/// `[00:00:00, 23:59:59.999]` UTC.
///
/// Walk-in conflict checks are confined to this window — both the
/// advisory checker and the transactional re-check at creation use the
/// same bounds.
pub fn walkin_day_bounds(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = instant
        .date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    let end = start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_have_no_outgoing_edges() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(!BookingStatus::Completed.can_transition_to(next));
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn lifecycle_edges() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn only_pending_and_confirmed_are_active() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }

    #[test]
    fn walkin_day_bounds_cover_the_full_day() {
        let instant = "2024-06-01T14:30:00Z".parse().unwrap();
        let (start, end) = walkin_day_bounds(instant);
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-06-01T23:59:59.999+00:00");
    }
}

//! Availability checking.
//!
//! Two disjoint algorithms by booking kind: standard bookings are
//! exclusive over their whole date range, while walk-ins multiplex one
//! physical unit across a single calendar day. Answers are advisory
//! under concurrent writers — the authoritative re-check runs inside
//! the creation transaction in the store.

use chrono::{DateTime, Utc};
use innkeep_core::error::InnkeepResult;
use innkeep_core::models::booking::{BookingKind, walkin_day_bounds};
use innkeep_core::repository::BookingRepository;
use uuid::Uuid;

/// Half-open interval overlap test: true iff `[a_start, a_end)` and
/// `[b_start, b_end)` intersect.
///
/// One comparison pair covers all three relative layouts — starts
/// inside, ends inside, and containment.
pub fn ranges_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Decides whether a stay can be booked.
pub struct AvailabilityChecker<B: BookingRepository> {
    bookings: B,
}

impl<B: BookingRepository> AvailabilityChecker<B> {
    pub fn new(bookings: B) -> Self {
        Self { bookings }
    }

    /// Whether `[check_in, check_out)` can be booked on the given
    /// accommodation. `exclude` lets update-in-place checks ignore the
    /// booking being modified.
    pub async fn is_available(
        &self,
        accommodation_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        kind: BookingKind,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<bool> {
        match kind {
            BookingKind::WalkIn => {
                self.walkin_slot_free(accommodation_id, check_in, check_out, exclude)
                    .await
            }
            _ => {
                // Whole-range exclusivity: any active booking
                // overlapping the range blocks, whatever its kind.
                let conflicts = self
                    .bookings
                    .find_overlapping(accommodation_id, check_in, check_out, exclude)
                    .await?;
                Ok(conflicts.is_empty())
            }
        }
    }

    /// Walk-in check. Against other walk-ins the conflict window is
    /// the check-in's calendar day, so several disjoint walk-ins can
    /// share one unit per day. An active standard booking overlapping
    /// the requested window still blocks — a date-range-exclusive stay
    /// and a walk-in can never share the unit.
    async fn walkin_slot_free(
        &self,
        accommodation_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<bool> {
        let standard = self
            .bookings
            .find_overlapping(accommodation_id, check_in, check_out, exclude)
            .await?;
        if standard.iter().any(|b| b.kind != BookingKind::WalkIn) {
            return Ok(false);
        }

        let (day_start, day_end) = walkin_day_bounds(check_in);
        let same_day = self
            .bookings
            .find_walkins_on_day(accommodation_id, day_start, day_end, exclude)
            .await?;

        Ok(!same_day
            .iter()
            .any(|b| ranges_overlap(check_in, check_out, b.check_in, b.check_out)))
    }
}

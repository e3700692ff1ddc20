//! Stay pricing.
//!
//! Pure policy math: deterministic, side-effect free, safe to compute
//! speculatively for quote previews. The stored breakdown on a booking
//! is exactly what this module returned at creation time.

use chrono::{DateTime, Utc};
use innkeep_core::models::accommodation::{Accommodation, BillingMode};
use innkeep_core::models::booking::{BookingKind, PricingBreakdown};

use crate::error::BookingError;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;
/// Flat 30-day month approximation. Calendar-exact months would change
/// billing amounts and need product sign-off first.
const MONTH_MS: i64 = 30 * DAY_MS;

/// Compute the price of a stay.
///
/// `unit_price` is the seasonal override when present, else the base
/// price. Walk-ins are always billed one full day regardless of hours
/// occupied. Other kinds bill by the accommodation's configured mode
/// with ceiling division: partial units round up.
pub fn calculate(
    accommodation: &Accommodation,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    kind: BookingKind,
) -> Result<PricingBreakdown, BookingError> {
    if check_out <= check_in {
        return Err(BookingError::InvalidDateRange);
    }

    let rate = &accommodation.rate;
    let unit_price = rate.seasonal_price.unwrap_or(rate.base_price);

    let (mode, quantity) = if kind == BookingKind::WalkIn {
        (BillingMode::Nightly, 1)
    } else {
        let duration_ms = (check_out - check_in).num_milliseconds();
        match rate.billing_mode {
            BillingMode::Hourly => (
                BillingMode::Hourly,
                (duration_ms as u64).div_ceil(HOUR_MS as u64) as i64,
            ),
            BillingMode::Monthly => (
                BillingMode::Monthly,
                (duration_ms as u64).div_ceil(MONTH_MS as u64) as i64,
            ),
            BillingMode::Nightly => (
                BillingMode::Nightly,
                (duration_ms as u64).div_ceil(DAY_MS as u64) as i64,
            ),
        }
    };

    let subtotal = unit_price * quantity;

    Ok(PricingBreakdown {
        mode,
        unit_price,
        quantity,
        subtotal,
        // Discounts and taxes are applied downstream by invoicing.
        total: subtotal,
        currency: rate.currency.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use innkeep_core::models::accommodation::{
        AccommodationKind, AccommodationStatus, RateCard,
    };
    use uuid::Uuid;

    fn test_accommodation(billing_mode: BillingMode, seasonal: Option<i64>) -> Accommodation {
        Accommodation {
            id: Uuid::new_v4(),
            establishment_id: Uuid::new_v4(),
            name: "Suite 7".into(),
            kind: AccommodationKind::Suite,
            max_guests: 2,
            rate: RateCard {
                base_price: 50_000,
                seasonal_price: seasonal,
                currency: "BIF".into(),
                billing_mode,
            },
            status: AccommodationStatus::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn nightly_two_night_stay() {
        let acc = test_accommodation(BillingMode::Nightly, None);
        let breakdown = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 3, 14, 0),
            BookingKind::Online,
        )
        .unwrap();

        assert_eq!(breakdown.mode, BillingMode::Nightly);
        assert_eq!(breakdown.unit_price, 50_000);
        assert_eq!(breakdown.quantity, 2);
        assert_eq!(breakdown.subtotal, 100_000);
        assert_eq!(breakdown.total, 100_000);
        assert_eq!(breakdown.currency, "BIF");
    }

    #[test]
    fn nightly_partial_night_rounds_up() {
        let acc = test_accommodation(BillingMode::Nightly, None);
        let breakdown = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 3, 15, 0),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(breakdown.quantity, 3);
    }

    #[test]
    fn hourly_ceiling_semantics() {
        let acc = test_accommodation(BillingMode::Hourly, None);

        // Exactly 25 hours -> 25 units.
        let exact = calculate(
            &acc,
            at(2024, 6, 1, 8, 0),
            at(2024, 6, 2, 9, 0),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(exact.quantity, 25);

        // 25 hours and one minute -> 26 units.
        let over = calculate(
            &acc,
            at(2024, 6, 1, 8, 0),
            at(2024, 6, 2, 9, 1),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(over.quantity, 26);
    }

    #[test]
    fn monthly_uses_flat_thirty_day_months() {
        let acc = test_accommodation(BillingMode::Monthly, None);

        let one_month = calculate(
            &acc,
            at(2024, 6, 1, 0, 0),
            at(2024, 7, 1, 0, 0),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(one_month.quantity, 1);

        // 31 days exceeds the 30-day unit and rounds up.
        let over = calculate(
            &acc,
            at(2024, 7, 1, 0, 0),
            at(2024, 8, 1, 0, 0),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(over.quantity, 2);
    }

    #[test]
    fn walkin_always_bills_one_nightly_unit() {
        // Even on an hourly accommodation, a three-hour walk-in is a
        // full-day charge.
        let acc = test_accommodation(BillingMode::Hourly, None);
        let breakdown = calculate(
            &acc,
            at(2024, 6, 1, 10, 0),
            at(2024, 6, 1, 13, 0),
            BookingKind::WalkIn,
        )
        .unwrap();

        assert_eq!(breakdown.mode, BillingMode::Nightly);
        assert_eq!(breakdown.quantity, 1);
        assert_eq!(breakdown.total, 50_000);
    }

    #[test]
    fn seasonal_override_takes_precedence() {
        let acc = test_accommodation(BillingMode::Nightly, Some(80_000));
        let breakdown = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 2, 14, 0),
            BookingKind::Online,
        )
        .unwrap();
        assert_eq!(breakdown.unit_price, 80_000);
        assert_eq!(breakdown.total, 80_000);
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let acc = test_accommodation(BillingMode::Nightly, Some(65_000));
        let a = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 4, 10, 0),
            BookingKind::Onsite,
        )
        .unwrap();
        let b = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 4, 10, 0),
            BookingKind::Onsite,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let acc = test_accommodation(BillingMode::Nightly, None);
        let result = calculate(
            &acc,
            at(2024, 6, 3, 14, 0),
            at(2024, 6, 1, 14, 0),
            BookingKind::Online,
        );
        assert!(matches!(result, Err(BookingError::InvalidDateRange)));

        let zero = calculate(
            &acc,
            at(2024, 6, 1, 14, 0),
            at(2024, 6, 1, 14, 0),
            BookingKind::Online,
        );
        assert!(matches!(zero, Err(BookingError::InvalidDateRange)));
    }
}

//! Integration tests for the booking lifecycle service against
//! in-memory SurrealDB.

use chrono::{DateTime, Duration, TimeZone, Utc};
use innkeep_booking::{BookingConfig, BookingPatch, BookingService, CreateBookingRequest};
use innkeep_core::error::InnkeepError;
use innkeep_core::models::accommodation::{
    AccommodationKind, AccommodationStatus, BillingMode, CreateAccommodation, RateCard,
};
use innkeep_core::models::booking::{
    BookingKind, BookingStatus, GuestContact, PaymentStatus,
};
use innkeep_core::models::establishment::{CreateEstablishment, PricingMode};
use innkeep_core::repository::{
    AccommodationRepository, BookingFilter, ClientRepository, EstablishmentRepository,
    Pagination,
};
use innkeep_core::scope::AccessScope;
use innkeep_db::repository::{
    SurrealAccommodationRepository, SurrealBookingRepository, SurrealClientRepository,
    SurrealEstablishmentRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = BookingService<
    SurrealEstablishmentRepository<Db>,
    SurrealAccommodationRepository<Db>,
    SurrealBookingRepository<Db>,
    SurrealClientRepository<Db>,
>;

/// Spin up in-memory DB, run migrations, create one establishment
/// with one nightly accommodation (base price 50000 BIF, 2 guests).
async fn setup() -> (Service, Uuid, Uuid, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    innkeep_db::run_migrations(&db).await.unwrap();

    let est_repo = SurrealEstablishmentRepository::new(db.clone());
    let establishment = est_repo
        .create(CreateEstablishment {
            name: "Lakeside Lodge".into(),
            slug: "lakeside".into(),
            total_capacity: 40,
            pricing_mode: PricingMode::Nightly,
        })
        .await
        .unwrap();

    let acc_repo = SurrealAccommodationRepository::new(db.clone());
    let accommodation = acc_repo
        .create(CreateAccommodation {
            establishment_id: establishment.id,
            name: "Suite 7".into(),
            kind: AccommodationKind::Suite,
            max_guests: 2,
            rate: RateCard {
                base_price: 50_000,
                seasonal_price: None,
                currency: "BIF".into(),
                billing_mode: BillingMode::Nightly,
            },
        })
        .await
        .unwrap();

    let service = BookingService::new(
        SurrealEstablishmentRepository::new(db.clone()),
        SurrealAccommodationRepository::new(db.clone()),
        SurrealBookingRepository::new(db.clone()),
        SurrealClientRepository::new(db.clone()),
        BookingConfig::default(),
    );

    (service, establishment.id, accommodation.id, db)
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
}

fn request(
    accommodation_id: Uuid,
    kind: BookingKind,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> CreateBookingRequest {
    CreateBookingRequest {
        establishment_id: None,
        accommodation_id,
        kind,
        check_in,
        check_out,
        guests: 2,
        contact: GuestContact {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: None,
        },
        companions: vec![],
    }
}

// -----------------------------------------------------------------------
// End-to-end scenario
// -----------------------------------------------------------------------

#[tokio::test]
async fn book_conflict_cancel_rebook() {
    let (service, _est, acc, db) = setup().await;
    let scope = AccessScope::Unrestricted;

    // Two nights at 50000 BIF.
    let booking = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &scope,
        )
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.pricing.mode, BillingMode::Nightly);
    assert_eq!(booking.pricing.unit_price, 50_000);
    assert_eq!(booking.pricing.quantity, 2);
    assert_eq!(booking.pricing.subtotal, 100_000);
    assert_eq!(booking.pricing.total, 100_000);

    let acc_repo = SurrealAccommodationRepository::new(db.clone());
    assert_eq!(
        acc_repo.get_by_id(acc).await.unwrap().status,
        AccommodationStatus::Reserved
    );

    // Overlapping second request fails.
    let second = request(acc, BookingKind::Online, day(2, 0), day(4, 0));
    let result = service.create(second.clone(), &scope).await;
    assert!(matches!(result, Err(InnkeepError::NotAvailable { .. })));

    // Cancelling the first frees the unit.
    let cancelled = service.cancel(booking.id, &scope).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(
        acc_repo.get_by_id(acc).await.unwrap().status,
        AccommodationStatus::Available
    );

    // The retried second request now succeeds.
    let rebooked = service.create(second, &scope).await.unwrap();
    assert_eq!(rebooked.status, BookingStatus::Pending);
    assert_eq!(rebooked.check_in, day(2, 0));
}

// -----------------------------------------------------------------------
// Scope and tenancy
// -----------------------------------------------------------------------

#[tokio::test]
async fn cross_establishment_booking_is_rejected_for_any_scope() {
    let (service, _est, acc, _db) = setup().await;
    let other_establishment = Uuid::new_v4();

    // Unrestricted caller naming the wrong establishment.
    let mut req = request(acc, BookingKind::Online, day(1, 0), day(3, 0));
    req.establishment_id = Some(other_establishment);
    let result = service.create(req, &AccessScope::Unrestricted).await;
    assert!(matches!(
        result,
        Err(InnkeepError::CrossEstablishmentRelationship { .. })
    ));

    // Restricted caller from another establishment: its own
    // establishment is forced, and the accommodation is foreign to it.
    let req = request(acc, BookingKind::Online, day(1, 0), day(3, 0));
    let result = service
        .create(req, &AccessScope::RestrictedTo(other_establishment))
        .await;
    assert!(matches!(
        result,
        Err(InnkeepError::CrossEstablishmentRelationship { .. })
    ));
}

#[tokio::test]
async fn restricted_scope_ignores_client_supplied_establishment() {
    let (service, est, acc, _db) = setup().await;

    // The request lies about the establishment; the restricted scope's
    // own establishment wins and matches the accommodation owner.
    let mut req = request(acc, BookingKind::Online, day(1, 0), day(3, 0));
    req.establishment_id = Some(Uuid::new_v4());
    let booking = service
        .create(req, &AccessScope::RestrictedTo(est))
        .await
        .unwrap();
    assert_eq!(booking.establishment_id, est);
}

#[tokio::test]
async fn reads_are_scope_checked() {
    let (service, _est, acc, _db) = setup().await;
    let booking = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();

    let foreign = AccessScope::RestrictedTo(Uuid::new_v4());
    let result = service.get(booking.id, &foreign).await;
    assert!(matches!(result, Err(InnkeepError::AccessDenied)));
}

#[tokio::test]
async fn list_is_confined_to_the_restricted_establishment() {
    let (service, est, acc, _db) = setup().await;
    service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();

    // A restricted caller asking for another establishment's bookings
    // gets its own establishment's page instead.
    let foreign = Uuid::new_v4();
    let page = service
        .list(
            BookingFilter {
                establishment_id: Some(est),
                ..Default::default()
            },
            &AccessScope::RestrictedTo(foreign),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let own = service
        .list(
            BookingFilter::default(),
            &AccessScope::RestrictedTo(est),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(own.total, 1);
}

// -----------------------------------------------------------------------
// Validation and gates
// -----------------------------------------------------------------------

#[tokio::test]
async fn reversed_dates_and_zero_guests_fail_fast() {
    let (service, _est, acc, _db) = setup().await;
    let scope = AccessScope::Unrestricted;

    let reversed = request(acc, BookingKind::Online, day(3, 0), day(1, 0));
    assert!(matches!(
        service.create(reversed, &scope).await,
        Err(InnkeepError::Validation { .. })
    ));

    let mut no_guests = request(acc, BookingKind::Online, day(1, 0), day(3, 0));
    no_guests.guests = 0;
    assert!(matches!(
        service.create(no_guests, &scope).await,
        Err(InnkeepError::Validation { .. })
    ));
}

#[tokio::test]
async fn guest_count_above_capacity_is_rejected() {
    let (service, _est, acc, _db) = setup().await;

    let mut req = request(acc, BookingKind::Online, day(1, 0), day(3, 0));
    req.guests = 3; // the suite sleeps 2
    let result = service.create(req, &AccessScope::Unrestricted).await;
    assert!(matches!(
        result,
        Err(InnkeepError::CapacityExceeded {
            requested: 3,
            max: 2
        })
    ));
}

#[tokio::test]
async fn unit_in_maintenance_is_not_bookable() {
    let (service, _est, acc, db) = setup().await;

    SurrealAccommodationRepository::new(db.clone())
        .set_status(acc, AccommodationStatus::Maintenance)
        .await
        .unwrap();

    let result = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await;
    assert!(matches!(
        result,
        Err(InnkeepError::AccommodationNotBookable { .. })
    ));

    // Walk-ins tolerate `Reserved`, but never a unit out of service.
    let result = service
        .create(
            request(acc, BookingKind::WalkIn, day(1, 10), day(1, 14)),
            &AccessScope::Unrestricted,
        )
        .await;
    assert!(matches!(
        result,
        Err(InnkeepError::AccommodationNotBookable { .. })
    ));
}

#[tokio::test]
async fn inactive_establishment_stops_accepting_bookings() {
    let (service, est, acc, db) = setup().await;

    SurrealEstablishmentRepository::new(db.clone())
        .deactivate(est)
        .await
        .unwrap();

    let result = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await;
    assert!(matches!(result, Err(InnkeepError::Validation { .. })));
}

// -----------------------------------------------------------------------
// Lifecycle transitions
// -----------------------------------------------------------------------

#[tokio::test]
async fn confirm_marks_paid_atomically() {
    let (service, _est, acc, _db) = setup().await;
    let booking = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Unpaid);

    let confirmed = service.confirm(booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn terminal_states_reject_further_transitions() {
    let (service, _est, acc, _db) = setup().await;
    let scope = AccessScope::Unrestricted;
    let booking = service
        .create(request(acc, BookingKind::Online, day(1, 0), day(3, 0)), &scope)
        .await
        .unwrap();

    service.cancel(booking.id, &scope).await.unwrap();

    assert!(matches!(
        service.confirm(booking.id).await,
        Err(InnkeepError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.complete(booking.id).await,
        Err(InnkeepError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.cancel(booking.id, &scope).await,
        Err(InnkeepError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn pending_bookings_cannot_complete() {
    let (service, _est, acc, _db) = setup().await;
    let booking = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();

    assert!(matches!(
        service.complete(booking.id).await,
        Err(InnkeepError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn completion_releases_the_unit_and_updates_the_client() {
    let (service, _est, acc, db) = setup().await;
    let booking = service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();
    service.confirm(booking.id).await.unwrap();

    let completed = service.complete(booking.id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    let unit = SurrealAccommodationRepository::new(db.clone())
        .get_by_id(acc)
        .await
        .unwrap();
    assert_eq!(unit.status, AccommodationStatus::Available);

    let client = SurrealClientRepository::new(db.clone())
        .get_by_email("jane@example.com")
        .await
        .unwrap();
    assert_eq!(client.total_stays, 1);
    assert_eq!(client.total_spent, 100_000);
    assert_eq!(client.booking_ids, vec![booking.id]);
}

#[tokio::test]
async fn completing_a_walkin_keeps_the_unit_while_another_covers_now() {
    let (service, _est, acc, db) = setup().await;
    let scope = AccessScope::Unrestricted;
    let now = Utc::now();

    // Walk-in A ended an hour ago; walk-in B covers this instant.
    let a = service
        .create(
            request(
                acc,
                BookingKind::WalkIn,
                now - Duration::hours(4),
                now - Duration::hours(1),
            ),
            &scope,
        )
        .await
        .unwrap();
    let b = service
        .create(
            request(
                acc,
                BookingKind::WalkIn,
                now - Duration::hours(1),
                now + Duration::hours(2),
            ),
            &scope,
        )
        .await
        .unwrap();
    service.confirm(a.id).await.unwrap();
    service.confirm(b.id).await.unwrap();

    let acc_repo = SurrealAccommodationRepository::new(db.clone());

    // Completing A leaves the unit held: B still covers "now".
    service.complete(a.id).await.unwrap();
    assert_eq!(
        acc_repo.get_by_id(acc).await.unwrap().status,
        AccommodationStatus::Reserved
    );

    // Completing the last active walk-in frees it.
    service.complete(b.id).await.unwrap();
    assert_eq!(
        acc_repo.get_by_id(acc).await.unwrap().status,
        AccommodationStatus::Available
    );
}

#[tokio::test]
async fn delete_is_an_administrative_removal() {
    let (service, _est, acc, db) = setup().await;
    let scope = AccessScope::Unrestricted;
    let booking = service
        .create(request(acc, BookingKind::Online, day(1, 0), day(3, 0)), &scope)
        .await
        .unwrap();

    assert!(service.delete(booking.id, &scope).await.unwrap());

    // Gone, and the unit is free again.
    assert!(matches!(
        service.get(booking.id, &scope).await,
        Err(InnkeepError::NotFound { .. })
    ));
    let unit = SurrealAccommodationRepository::new(db.clone())
        .get_by_id(acc)
        .await
        .unwrap();
    assert_eq!(unit.status, AccommodationStatus::Available);

    // Deleting a missing booking reports false, not an error.
    assert!(!service.delete(Uuid::new_v4(), &scope).await.unwrap());
}

// -----------------------------------------------------------------------
// Updates and quotes
// -----------------------------------------------------------------------

#[tokio::test]
async fn extending_a_stay_reprices_it() {
    let (service, _est, acc, _db) = setup().await;
    let scope = AccessScope::Unrestricted;
    let booking = service
        .create(request(acc, BookingKind::Online, day(1, 0), day(3, 0)), &scope)
        .await
        .unwrap();
    assert_eq!(booking.pricing.total, 100_000);

    // Extending by one night re-checks availability (excluding the
    // booking itself) and replaces the stored breakdown.
    let updated = service
        .update(
            booking.id,
            BookingPatch {
                check_out: Some(day(4, 0)),
                ..Default::default()
            },
            &scope,
        )
        .await
        .unwrap();
    assert_eq!(updated.check_out, day(4, 0));
    assert_eq!(updated.pricing.quantity, 3);
    assert_eq!(updated.pricing.total, 150_000);
}

#[tokio::test]
async fn update_rejects_a_range_taken_by_another_booking() {
    let (service, _est, acc, db) = setup().await;
    let scope = AccessScope::Unrestricted;

    let first = service
        .create(request(acc, BookingKind::Online, day(1, 0), day(3, 0)), &scope)
        .await
        .unwrap();

    // Free the unit, then book the following nights separately.
    SurrealAccommodationRepository::new(db.clone())
        .set_status(acc, AccommodationStatus::Available)
        .await
        .unwrap();
    service
        .create(request(acc, BookingKind::Online, day(3, 0), day(5, 0)), &scope)
        .await
        .unwrap();

    // Sliding the first booking onto the second's nights must fail.
    let result = service
        .update(
            first.id,
            BookingPatch {
                check_out: Some(day(4, 0)),
                ..Default::default()
            },
            &scope,
        )
        .await;
    assert!(matches!(result, Err(InnkeepError::NotAvailable { .. })));
}

#[tokio::test]
async fn pricing_preview_has_no_side_effects() {
    let (service, _est, acc, _db) = setup().await;

    let quote = service
        .calculate_pricing(acc, day(1, 0), day(3, 0), BookingKind::Online)
        .await
        .unwrap();
    assert_eq!(quote.total, 100_000);

    // Quoting twice is bit-identical and books nothing.
    let again = service
        .calculate_pricing(acc, day(1, 0), day(3, 0), BookingKind::Online)
        .await
        .unwrap();
    assert_eq!(quote, again);
    assert!(
        service
            .check_availability(acc, day(1, 0), day(3, 0), BookingKind::Online, None)
            .await
            .unwrap()
    );

    let missing = service
        .calculate_pricing(Uuid::new_v4(), day(1, 0), day(3, 0), BookingKind::Online)
        .await;
    assert!(matches!(missing, Err(InnkeepError::NotFound { .. })));
}

#[tokio::test]
async fn availability_is_unaffected_by_unrelated_ranges() {
    let (service, _est, acc, _db) = setup().await;

    service
        .create(
            request(acc, BookingKind::Online, day(1, 0), day(3, 0)),
            &AccessScope::Unrestricted,
        )
        .await
        .unwrap();

    // A disjoint later range stays available.
    assert!(
        service
            .check_availability(acc, day(10, 0), day(12, 0), BookingKind::Online, None)
            .await
            .unwrap()
    );
    // The overlapping one does not.
    assert!(
        !service
            .check_availability(acc, day(2, 0), day(4, 0), BookingKind::Online, None)
            .await
            .unwrap()
    );
}

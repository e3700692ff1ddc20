//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The booking repository carries
//! the concurrency-critical operations: `create_if_available` closes
//! the check-then-act race between the availability answer and the
//! reservation write, and `confirm` flips booking status and payment
//! status in a single store write.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::InnkeepResult;
use crate::models::{
    accommodation::{
        Accommodation, AccommodationStatus, CreateAccommodation, UpdateAccommodation,
    },
    booking::{Booking, BookingKind, BookingStatus, CreateBooking, UpdateBooking},
    client::{Client, CreateClient},
    establishment::{CreateEstablishment, Establishment, UpdateEstablishment},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Query filters for booking list queries.
///
/// The establishment constraint is where
/// [`AccessScope::apply_filter`](crate::scope::AccessScope::apply_filter)
/// injects tenant isolation before the query runs.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub establishment_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub kind: Option<BookingKind>,
    /// Earliest check-in instant, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest check-in instant, inclusive.
    pub to: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Establishments
// ---------------------------------------------------------------------------

pub trait EstablishmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateEstablishment,
    ) -> impl Future<Output = InnkeepResult<Establishment>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = InnkeepResult<Establishment>> + Send;
    fn get_by_slug(&self, slug: &str)
    -> impl Future<Output = InnkeepResult<Establishment>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateEstablishment,
    ) -> impl Future<Output = InnkeepResult<Establishment>> + Send;
    /// Soft-delete: clears the active flag. Establishments are never
    /// hard-deleted by this core.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = InnkeepResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = InnkeepResult<PaginatedResult<Establishment>>> + Send;
}

// ---------------------------------------------------------------------------
// Accommodations (establishment-scoped)
// ---------------------------------------------------------------------------

pub trait AccommodationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAccommodation,
    ) -> impl Future<Output = InnkeepResult<Accommodation>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = InnkeepResult<Accommodation>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccommodation,
    ) -> impl Future<Output = InnkeepResult<Accommodation>> + Send;
    /// Direct status write — reserved for the lifecycle service.
    fn set_status(
        &self,
        id: Uuid,
        status: AccommodationStatus,
    ) -> impl Future<Output = InnkeepResult<()>> + Send;
    fn list_by_establishment(
        &self,
        establishment_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = InnkeepResult<PaginatedResult<Accommodation>>> + Send;
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub trait BookingRepository: Send + Sync {
    /// Conflict-guarded insert: re-runs the kind-appropriate overlap
    /// check, creates the booking, and flips the accommodation to
    /// `Reserved` inside one transaction. Two concurrent overlapping
    /// creates cannot both commit; the loser fails
    /// [`InnkeepError::NotAvailable`](crate::error::InnkeepError::NotAvailable).
    fn create_if_available(
        &self,
        input: CreateBooking,
    ) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateBooking,
    ) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    /// Atomic confirm: `status = Confirmed` and `payment_status = Paid`
    /// in a single write — the two fields are never observable apart.
    fn confirm(&self, id: Uuid) -> impl Future<Output = InnkeepResult<Booking>> + Send;
    /// Hard remove. An administrative correction path, not a
    /// cancellation alias.
    fn delete(&self, id: Uuid) -> impl Future<Output = InnkeepResult<()>> + Send;
    fn list(
        &self,
        filter: BookingFilter,
        pagination: Pagination,
    ) -> impl Future<Output = InnkeepResult<PaginatedResult<Booking>>> + Send;

    /// Active (pending/confirmed) bookings of any kind overlapping the
    /// half-open range `[from, to)`.
    fn find_overlapping(
        &self,
        accommodation_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = InnkeepResult<Vec<Booking>>> + Send;

    /// Active walk-in bookings whose check-in falls inside the given
    /// day window.
    fn find_walkins_on_day(
        &self,
        accommodation_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = InnkeepResult<Vec<Booking>>> + Send;

    /// Active bookings covering the given instant
    /// (`check_in <= at < check_out`).
    fn find_active_at(
        &self,
        accommodation_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = InnkeepResult<Vec<Booking>>> + Send;

    /// Durable-store uniqueness probe for the code allocator.
    fn code_exists(&self, code: &str) -> impl Future<Output = InnkeepResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Clients (guest directory, keyed by email)
// ---------------------------------------------------------------------------

pub trait ClientRepository: Send + Sync {
    fn create(&self, input: CreateClient) -> impl Future<Output = InnkeepResult<Client>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = InnkeepResult<Client>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = InnkeepResult<Client>> + Send;
    /// Append a booking to the client's history.
    fn append_booking(
        &self,
        id: Uuid,
        booking_id: Uuid,
    ) -> impl Future<Output = InnkeepResult<()>> + Send;
    /// Fold a completed stay into the aggregates
    /// (`total_stays += 1`, `total_spent += amount`).
    fn record_completion(
        &self,
        id: Uuid,
        amount: i64,
    ) -> impl Future<Output = InnkeepResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = InnkeepResult<PaginatedResult<Client>>> + Send;
}

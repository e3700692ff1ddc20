//! Booking lifecycle orchestration.
//!
//! The service composes scope enforcement, availability checking,
//! pricing, and code allocation, and owns every accommodation status
//! transition. Errors from the composed components pass through
//! untouched — the boundary layer maps them to transport responses.

use chrono::Utc;
use innkeep_core::error::{InnkeepError, InnkeepResult};
use innkeep_core::models::accommodation::AccommodationStatus;
use innkeep_core::models::booking::{
    Booking, BookingKind, BookingStatus, CreateBooking, GuestContact, PaymentStatus,
    PricingBreakdown, UpdateBooking,
};
use innkeep_core::models::client::{Client, CreateClient};
use innkeep_core::repository::{
    AccommodationRepository, BookingFilter, BookingRepository, ClientRepository,
    EstablishmentRepository, PaginatedResult, Pagination,
};
use innkeep_core::scope::AccessScope;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::allocator::CodeAllocator;
use crate::availability::AvailabilityChecker;
use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::pricing;

/// Input for booking creation.
#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    /// Target establishment. Ignored for restricted scopes, which
    /// always book within their own establishment.
    pub establishment_id: Option<Uuid>,
    pub accommodation_id: Uuid,
    pub kind: BookingKind,
    pub check_in: chrono::DateTime<Utc>,
    pub check_out: chrono::DateTime<Utc>,
    pub guests: u32,
    pub contact: GuestContact,
    pub companions: Vec<String>,
}

/// Caller-facing patch for booking updates. Pricing is recomputed by
/// the service when dates change — never supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub check_in: Option<chrono::DateTime<Utc>>,
    pub check_out: Option<chrono::DateTime<Utc>>,
    pub guests: Option<u32>,
    pub contact: Option<GuestContact>,
    pub companions: Option<Vec<String>>,
    pub payment_status: Option<PaymentStatus>,
}

/// Booking lifecycle service.
///
/// Generic over repository implementations so that the engine has no
/// dependency on the database crate.
pub struct BookingService<E, A, B, C>
where
    E: EstablishmentRepository,
    A: AccommodationRepository,
    B: BookingRepository + Clone,
    C: ClientRepository,
{
    establishments: E,
    accommodations: A,
    bookings: B,
    clients: C,
    availability: AvailabilityChecker<B>,
    allocator: CodeAllocator<B>,
}

impl<E, A, B, C> BookingService<E, A, B, C>
where
    E: EstablishmentRepository,
    A: AccommodationRepository,
    B: BookingRepository + Clone,
    C: ClientRepository,
{
    pub fn new(
        establishments: E,
        accommodations: A,
        bookings: B,
        clients: C,
        config: BookingConfig,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(bookings.clone()),
            allocator: CodeAllocator::new(bookings.clone(), config),
            establishments,
            accommodations,
            bookings,
            clients,
        }
    }

    /// The code allocator, exposed for background refill wiring.
    pub fn allocator(&self) -> &CodeAllocator<B> {
        &self.allocator
    }

    /// Create a booking.
    ///
    /// All-or-nothing: the availability re-check, the booking insert,
    /// and the accommodation reservation commit in one store
    /// transaction, so no partial booking survives a failed step.
    pub async fn create(
        &self,
        request: CreateBookingRequest,
        scope: &AccessScope,
    ) -> InnkeepResult<Booking> {
        // 1. Defensive re-validation — the boundary validates first,
        //    but pricing math must never see a reversed range.
        if request.check_out <= request.check_in {
            return Err(BookingError::InvalidDateRange.into());
        }
        if request.guests == 0 {
            return Err(BookingError::NoGuests.into());
        }

        // 2. Load the accommodation and resolve the effective
        //    establishment. Restricted scopes always book within their
        //    own establishment; a client-supplied value is never
        //    trusted for them.
        let accommodation = self
            .accommodations
            .get_by_id(request.accommodation_id)
            .await?;
        let effective = match scope {
            AccessScope::RestrictedTo(own) => *own,
            AccessScope::Unrestricted => request
                .establishment_id
                .unwrap_or(accommodation.establishment_id),
        };

        // 3. Ownership integrity. A mismatch means a client bypassing
        //    intended flows, whatever the caller's scope.
        if accommodation.establishment_id != effective {
            error!(
                accommodation = %accommodation.id,
                owner = %accommodation.establishment_id,
                requested = %effective,
                "cross-establishment booking rejected"
            );
            return Err(InnkeepError::CrossEstablishmentRelationship {
                accommodation_establishment: accommodation.establishment_id,
                requested: effective,
            });
        }

        // 4. The owning establishment must still accept bookings.
        let establishment = self.establishments.get_by_id(effective).await?;
        if !establishment.active {
            return Err(InnkeepError::Validation {
                message: "establishment is not accepting bookings".into(),
            });
        }

        // 5. Unit status gate. `Occupied`/`Maintenance` are operational
        //    states and always block. `Reserved` is booking-driven: for
        //    standard requests it reads as a plain availability
        //    conflict, while walk-ins tolerate it — they multiplex the
        //    unit, and the availability predicate below rejects any
        //    overlap with a standard stay instead.
        match accommodation.status {
            AccommodationStatus::Occupied | AccommodationStatus::Maintenance => {
                return Err(InnkeepError::AccommodationNotBookable {
                    status: accommodation.status.as_str().into(),
                });
            }
            AccommodationStatus::Reserved if request.kind != BookingKind::WalkIn => {
                return Err(InnkeepError::NotAvailable {
                    accommodation_id: accommodation.id,
                });
            }
            _ => {}
        }
        if request.guests > accommodation.max_guests {
            return Err(InnkeepError::CapacityExceeded {
                requested: request.guests,
                max: accommodation.max_guests,
            });
        }

        // 6. Advisory availability check — cheap rejection before any
        //    allocation or write. The store re-checks transactionally.
        let available = self
            .availability
            .is_available(
                accommodation.id,
                request.check_in,
                request.check_out,
                request.kind,
                None,
            )
            .await?;
        if !available {
            return Err(InnkeepError::NotAvailable {
                accommodation_id: accommodation.id,
            });
        }

        // 7. Price the stay and allocate a code.
        let breakdown =
            pricing::calculate(&accommodation, request.check_in, request.check_out, request.kind)?;
        let code = self.allocator.allocate().await?;

        // 8. Find or create the guest identity.
        let client = self.find_or_create_client(&request.contact).await?;

        // 9. Conflict-guarded persist: the booking lands `Pending` and
        //    the accommodation flips to `Reserved` in one transaction.
        let booking = self
            .bookings
            .create_if_available(CreateBooking {
                code,
                establishment_id: effective,
                accommodation_id: accommodation.id,
                client_id: client.id,
                kind: request.kind,
                check_in: request.check_in,
                check_out: request.check_out,
                guests: request.guests,
                contact: request.contact,
                companions: request.companions,
                pricing: breakdown,
            })
            .await?;

        // 10. Append to the client's history.
        self.clients.append_booking(client.id, booking.id).await?;

        info!(
            booking = %booking.id,
            code = %booking.code,
            accommodation = %booking.accommodation_id,
            establishment = %booking.establishment_id,
            "booking created"
        );
        Ok(booking)
    }

    /// Update a booking in place.
    ///
    /// A date change re-runs availability (excluding this booking) and
    /// replaces the stored pricing breakdown.
    pub async fn update(
        &self,
        id: Uuid,
        patch: BookingPatch,
        scope: &AccessScope,
    ) -> InnkeepResult<Booking> {
        let booking = self.bookings.get_by_id(id).await?;
        scope.enforce(booking.establishment_id, "booking")?;

        if !booking.status.is_active() {
            return Err(BookingError::NotModifiable {
                status: booking.status.as_str().into(),
            }
            .into());
        }

        let check_in = patch.check_in.unwrap_or(booking.check_in);
        let check_out = patch.check_out.unwrap_or(booking.check_out);
        if check_out <= check_in {
            return Err(BookingError::InvalidDateRange.into());
        }
        let dates_changed = check_in != booking.check_in || check_out != booking.check_out;

        let mut pricing_update: Option<PricingBreakdown> = None;

        if patch.guests.is_some() || dates_changed {
            let accommodation = self
                .accommodations
                .get_by_id(booking.accommodation_id)
                .await?;

            if let Some(guests) = patch.guests {
                if guests == 0 {
                    return Err(BookingError::NoGuests.into());
                }
                if guests > accommodation.max_guests {
                    return Err(InnkeepError::CapacityExceeded {
                        requested: guests,
                        max: accommodation.max_guests,
                    });
                }
            }

            if dates_changed {
                let available = self
                    .availability
                    .is_available(booking.accommodation_id, check_in, check_out, booking.kind, Some(id))
                    .await?;
                if !available {
                    return Err(InnkeepError::NotAvailable {
                        accommodation_id: booking.accommodation_id,
                    });
                }
                pricing_update =
                    Some(pricing::calculate(&accommodation, check_in, check_out, booking.kind)?);
            }
        }

        self.bookings
            .update(
                id,
                UpdateBooking {
                    check_in: patch.check_in,
                    check_out: patch.check_out,
                    guests: patch.guests,
                    contact: patch.contact,
                    companions: patch.companions,
                    payment_status: patch.payment_status,
                    pricing: pricing_update,
                },
            )
            .await
    }

    /// Cancel a pending or confirmed booking, releasing the
    /// accommodation if this booking held it in `Reserved`.
    pub async fn cancel(&self, id: Uuid, scope: &AccessScope) -> InnkeepResult<Booking> {
        let booking = self.bookings.get_by_id(id).await?;
        scope.enforce(booking.establishment_id, "booking")?;

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(InnkeepError::InvalidTransition {
                from: booking.status.as_str().into(),
                to: BookingStatus::Cancelled.as_str().into(),
            });
        }

        let cancelled = self.bookings.set_status(id, BookingStatus::Cancelled).await?;
        self.release_if_reserved(booking.accommodation_id).await?;

        info!(booking = %id, code = %booking.code, "booking cancelled");
        Ok(cancelled)
    }

    /// Confirm a pending booking.
    ///
    /// A single atomic transition: `status = Confirmed` and
    /// `payment_status = Paid` land in one store write.
    pub async fn confirm(&self, id: Uuid) -> InnkeepResult<Booking> {
        let booking = self.bookings.get_by_id(id).await?;

        if !booking.status.can_transition_to(BookingStatus::Confirmed) {
            return Err(InnkeepError::InvalidTransition {
                from: booking.status.as_str().into(),
                to: BookingStatus::Confirmed.as_str().into(),
            });
        }

        let confirmed = self.bookings.confirm(id).await?;
        info!(booking = %id, code = %booking.code, "booking confirmed");
        Ok(confirmed)
    }

    /// Complete a confirmed booking: release the accommodation and
    /// fold the stay into the client's aggregates.
    pub async fn complete(&self, id: Uuid) -> InnkeepResult<Booking> {
        let booking = self.bookings.get_by_id(id).await?;

        if !booking.status.can_transition_to(BookingStatus::Completed) {
            return Err(InnkeepError::InvalidTransition {
                from: booking.status.as_str().into(),
                to: BookingStatus::Completed.as_str().into(),
            });
        }

        let completed = self.bookings.set_status(id, BookingStatus::Completed).await?;

        // Walk-ins share the unit across a day — release only when no
        // other active booking covers this instant. Standard bookings
        // release immediately.
        let release = match booking.kind {
            BookingKind::WalkIn => self
                .bookings
                .find_active_at(booking.accommodation_id, Utc::now(), Some(id))
                .await?
                .is_empty(),
            _ => true,
        };
        if release {
            self.accommodations
                .set_status(booking.accommodation_id, AccommodationStatus::Available)
                .await?;
        }

        self.clients
            .record_completion(booking.client_id, booking.pricing.total)
            .await?;

        info!(booking = %id, code = %booking.code, "booking completed");
        Ok(completed)
    }

    /// Hard-remove a booking — an administrative correction path, not
    /// a cancellation alias. Returns `false` when no such booking
    /// exists.
    pub async fn delete(&self, id: Uuid, scope: &AccessScope) -> InnkeepResult<bool> {
        let booking = match self.bookings.get_by_id(id).await {
            Ok(b) => b,
            Err(InnkeepError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        scope.enforce(booking.establishment_id, "booking")?;

        self.bookings.delete(id).await?;
        if booking.status.is_active() {
            self.release_if_reserved(booking.accommodation_id).await?;
        }

        warn!(booking = %id, code = %booking.code, "booking hard-deleted");
        Ok(true)
    }

    /// List bookings visible to the given scope.
    pub async fn list(
        &self,
        mut filter: BookingFilter,
        scope: &AccessScope,
        pagination: Pagination,
    ) -> InnkeepResult<PaginatedResult<Booking>> {
        // Tenant isolation is injected into the query itself, never
        // applied as a post-filter.
        scope.apply_filter(&mut filter.establishment_id);
        self.bookings.list(filter, pagination).await
    }

    /// Fetch a single booking, scope-checked.
    pub async fn get(&self, id: Uuid, scope: &AccessScope) -> InnkeepResult<Booking> {
        let booking = self.bookings.get_by_id(id).await?;
        scope.enforce(booking.establishment_id, "booking")?;
        Ok(booking)
    }

    /// Advisory availability check for preview callers.
    pub async fn check_availability(
        &self,
        accommodation_id: Uuid,
        check_in: chrono::DateTime<Utc>,
        check_out: chrono::DateTime<Utc>,
        kind: BookingKind,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<bool> {
        self.availability
            .is_available(accommodation_id, check_in, check_out, kind, exclude)
            .await
    }

    /// Price a prospective stay without any side effects — safe for
    /// quote previews.
    pub async fn calculate_pricing(
        &self,
        accommodation_id: Uuid,
        check_in: chrono::DateTime<Utc>,
        check_out: chrono::DateTime<Utc>,
        kind: BookingKind,
    ) -> InnkeepResult<PricingBreakdown> {
        let accommodation = self.accommodations.get_by_id(accommodation_id).await?;
        Ok(pricing::calculate(&accommodation, check_in, check_out, kind)?)
    }

    /// Revert a `Reserved` accommodation to `Available`. Units in
    /// `Occupied` or `Maintenance` are left alone.
    async fn release_if_reserved(&self, accommodation_id: Uuid) -> InnkeepResult<()> {
        let accommodation = self.accommodations.get_by_id(accommodation_id).await?;
        if accommodation.status == AccommodationStatus::Reserved {
            self.accommodations
                .set_status(accommodation_id, AccommodationStatus::Available)
                .await?;
        }
        Ok(())
    }

    /// Look up the guest by email, creating the record on first
    /// contact.
    async fn find_or_create_client(&self, contact: &GuestContact) -> InnkeepResult<Client> {
        match self.clients.get_by_email(&contact.email).await {
            Ok(client) => Ok(client),
            Err(InnkeepError::NotFound { .. }) => {
                self.clients
                    .create(CreateClient {
                        email: contact.email.clone(),
                        full_name: contact.full_name.clone(),
                        phone: contact.phone.clone(),
                    })
                    .await
            }
            Err(e) => Err(e),
        }
    }
}

//! SurrealDB implementation of [`BookingRepository`].
//!
//! `create_if_available` is the authoritative availability gate: the
//! overlap re-check, the booking insert, and the accommodation
//! reservation run inside one transaction, so two concurrent
//! overlapping creates cannot both commit. The advisory checker in the
//! engine crate uses the same predicates but never gates the write.

use chrono::{DateTime, Utc};
use innkeep_core::error::InnkeepResult;
use innkeep_core::models::accommodation::BillingMode;
use innkeep_core::models::booking::{
    Booking, BookingKind, BookingStatus, CreateBooking, GuestContact, PaymentStatus,
    PricingBreakdown, UpdateBooking, walkin_day_bounds,
};
use innkeep_core::repository::{BookingFilter, BookingRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{BOOKING_CONFLICT, DbError};

/// Nested guest-contact object as stored on the record.
#[derive(Debug, Clone, SurrealValue)]
struct ContactRow {
    full_name: String,
    email: String,
    phone: Option<String>,
}

impl ContactRow {
    fn from_contact(contact: &GuestContact) -> Self {
        Self {
            full_name: contact.full_name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
        }
    }

    fn into_contact(self) -> GuestContact {
        GuestContact {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Nested pricing-breakdown object as stored on the record.
#[derive(Debug, Clone, SurrealValue)]
struct PricingRow {
    mode: String,
    unit_price: i64,
    quantity: i64,
    subtotal: i64,
    total: i64,
    currency: String,
}

impl PricingRow {
    fn from_pricing(pricing: &PricingBreakdown) -> Self {
        Self {
            mode: pricing.mode.as_str().into(),
            unit_price: pricing.unit_price,
            quantity: pricing.quantity,
            subtotal: pricing.subtotal,
            total: pricing.total,
            currency: pricing.currency.clone(),
        }
    }

    fn into_pricing(self) -> Result<PricingBreakdown, DbError> {
        Ok(PricingBreakdown {
            mode: parse_billing_mode(&self.mode)?,
            unit_price: self.unit_price,
            quantity: self.quantity,
            subtotal: self.subtotal,
            total: self.total,
            currency: self.currency,
        })
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct BookingRow {
    code: String,
    establishment_id: String,
    accommodation_id: String,
    client_id: String,
    kind: String,
    status: String,
    payment_status: String,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    guests: u32,
    contact: ContactRow,
    companions: Vec<String>,
    pricing: PricingRow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct BookingRowWithId {
    record_id: String,
    code: String,
    establishment_id: String,
    accommodation_id: String,
    client_id: String,
    kind: String,
    status: String,
    payment_status: String,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    guests: u32,
    contact: ContactRow,
    companions: Vec<String>,
    pricing: PricingRow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<BookingKind, DbError> {
    match s {
        "Online" => Ok(BookingKind::Online),
        "Onsite" => Ok(BookingKind::Onsite),
        "WalkIn" => Ok(BookingKind::WalkIn),
        other => Err(DbError::Migration(format!("unknown booking kind: {other}"))),
    }
}

fn parse_status(s: &str) -> Result<BookingStatus, DbError> {
    match s {
        "Pending" => Ok(BookingStatus::Pending),
        "Confirmed" => Ok(BookingStatus::Confirmed),
        "Completed" => Ok(BookingStatus::Completed),
        "Cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(DbError::Migration(format!(
            "unknown booking status: {other}"
        ))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, DbError> {
    match s {
        "Unpaid" => Ok(PaymentStatus::Unpaid),
        "Partial" => Ok(PaymentStatus::Partial),
        "Paid" => Ok(PaymentStatus::Paid),
        other => Err(DbError::Migration(format!(
            "unknown payment status: {other}"
        ))),
    }
}

fn parse_billing_mode(s: &str) -> Result<BillingMode, DbError> {
    match s {
        "Nightly" => Ok(BillingMode::Nightly),
        "Monthly" => Ok(BillingMode::Monthly),
        "Hourly" => Ok(BillingMode::Hourly),
        other => Err(DbError::Migration(format!("unknown billing mode: {other}"))),
    }
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        let establishment_id = Uuid::parse_str(&self.establishment_id)
            .map_err(|e| DbError::Migration(format!("invalid establishment UUID: {e}")))?;
        let accommodation_id = Uuid::parse_str(&self.accommodation_id)
            .map_err(|e| DbError::Migration(format!("invalid accommodation UUID: {e}")))?;
        let client_id = Uuid::parse_str(&self.client_id)
            .map_err(|e| DbError::Migration(format!("invalid client UUID: {e}")))?;
        Ok(Booking {
            id,
            code: self.code,
            establishment_id,
            accommodation_id,
            client_id,
            kind: parse_kind(&self.kind)?,
            status: parse_status(&self.status)?,
            payment_status: parse_payment_status(&self.payment_status)?,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            contact: self.contact.into_contact(),
            companions: self.companions,
            pricing: self.pricing.into_pricing()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let row = BookingRow {
            code: self.code,
            establishment_id: self.establishment_id,
            accommodation_id: self.accommodation_id,
            client_id: self.client_id,
            kind: self.kind,
            status: self.status,
            payment_status: self.payment_status,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            contact: self.contact,
            companions: self.companions,
            pricing: self.pricing,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_booking(id)
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Map a transaction error to [`DbError::Conflict`] when the thrown
/// conflict marker is present.
fn map_create_error(e: surrealdb::Error, accommodation_id: Uuid) -> DbError {
    if e.to_string().contains(BOOKING_CONFLICT) {
        DbError::Conflict { accommodation_id }
    } else {
        DbError::Surreal(e)
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create_if_available(&self, input: CreateBooking) -> InnkeepResult<Booking> {
        let id = Uuid::new_v4();
        let accommodation_id = input.accommodation_id;

        // The conflict predicate mirrors the advisory checker:
        // standard bookings collide with any active booking overlapping
        // the half-open range; walk-ins collide with overlapping active
        // walk-ins on the same calendar day, and with any overlapping
        // active standard stay.
        let conflict_clause = match input.kind {
            BookingKind::WalkIn => {
                "status IN ['Pending', 'Confirmed'] \
                 AND check_in < $check_out AND check_out > $check_in \
                 AND (kind != 'WalkIn' \
                      OR (check_in >= $day_start AND check_in <= $day_end))"
            }
            _ => {
                "status IN ['Pending', 'Confirmed'] \
                 AND check_in < $check_out AND check_out > $check_in"
            }
        };

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $conflicts = (SELECT VALUE id FROM booking \
                 WHERE accommodation_id = $accommodation_id \
                 AND {conflict_clause}); \
             IF array::len($conflicts) > 0 {{ THROW '{BOOKING_CONFLICT}' }}; \
             CREATE type::record('booking', $id) SET \
                 code = $code, \
                 establishment_id = $establishment_id, \
                 accommodation_id = $accommodation_id, \
                 client_id = $client_id, \
                 kind = $kind, \
                 status = 'Pending', \
                 payment_status = 'Unpaid', \
                 check_in = $check_in, \
                 check_out = $check_out, \
                 guests = $guests, \
                 contact = $contact, \
                 companions = $companions, \
                 pricing = $pricing; \
             UPDATE type::record('accommodation', $accommodation_id) SET \
                 status = 'Reserved', updated_at = time::now(); \
             COMMIT TRANSACTION;"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("code", input.code))
            .bind(("establishment_id", input.establishment_id.to_string()))
            .bind(("accommodation_id", accommodation_id.to_string()))
            .bind(("client_id", input.client_id.to_string()))
            .bind(("kind", input.kind.as_str()))
            .bind(("check_in", input.check_in))
            .bind(("check_out", input.check_out))
            .bind(("guests", input.guests))
            .bind(("contact", ContactRow::from_contact(&input.contact)))
            .bind(("companions", input.companions))
            .bind(("pricing", PricingRow::from_pricing(&input.pricing)));

        if input.kind == BookingKind::WalkIn {
            let (day_start, day_end) = walkin_day_bounds(input.check_in);
            builder = builder
                .bind(("day_start", day_start))
                .bind(("day_end", day_end));
        }

        let result = builder
            .await
            .map_err(|e| map_create_error(e, accommodation_id))?;
        result
            .check()
            .map_err(|e| map_create_error(e, accommodation_id))?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> InnkeepResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_code(&self, code: &str) -> InnkeepResult<Booking> {
        let code_owned = code.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM booking WHERE code = $code",
            )
            .bind(("code", code_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: format!("code={code}"),
        })?;

        Ok(row.try_into_booking()?)
    }

    async fn update(&self, id: Uuid, input: UpdateBooking) -> InnkeepResult<Booking> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.check_in.is_some() {
            sets.push("check_in = $check_in");
        }
        if input.check_out.is_some() {
            sets.push("check_out = $check_out");
        }
        if input.guests.is_some() {
            sets.push("guests = $guests");
        }
        if input.contact.is_some() {
            sets.push("contact = $contact");
        }
        if input.companions.is_some() {
            sets.push("companions = $companions");
        }
        if input.payment_status.is_some() {
            sets.push("payment_status = $payment_status");
        }
        if input.pricing.is_some() {
            sets.push("pricing = $pricing");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('booking', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(check_in) = input.check_in {
            builder = builder.bind(("check_in", check_in));
        }
        if let Some(check_out) = input.check_out {
            builder = builder.bind(("check_out", check_out));
        }
        if let Some(guests) = input.guests {
            builder = builder.bind(("guests", guests));
        }
        if let Some(contact) = input.contact {
            builder = builder.bind(("contact", ContactRow::from_contact(&contact)));
        }
        if let Some(companions) = input.companions {
            builder = builder.bind(("companions", companions));
        }
        if let Some(payment_status) = input.payment_status {
            builder = builder.bind(("payment_status", payment_status.as_str()));
        }
        if let Some(pricing) = input.pricing {
            builder = builder.bind(("pricing", PricingRow::from_pricing(&pricing)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> InnkeepResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('booking', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn confirm(&self, id: Uuid) -> InnkeepResult<Booking> {
        let id_str = id.to_string();

        // Single UPDATE statement: status and payment status are never
        // observable apart.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('booking', $id) SET \
                 status = 'Confirmed', payment_status = 'Paid', \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn delete(&self, id: Uuid) -> InnkeepResult<()> {
        self.db
            .query("DELETE type::record('booking', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        filter: BookingFilter,
        pagination: Pagination,
    ) -> InnkeepResult<PaginatedResult<Booking>> {
        let mut conditions = Vec::new();
        if filter.establishment_id.is_some() {
            conditions.push("establishment_id = $establishment_id");
        }
        if filter.accommodation_id.is_some() {
            conditions.push("accommodation_id = $accommodation_id");
        }
        if filter.client_id.is_some() {
            conditions.push("client_id = $client_id");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.kind.is_some() {
            conditions.push("kind = $kind");
        }
        if filter.from.is_some() {
            conditions.push("check_in >= $from");
        }
        if filter.to.is_some() {
            conditions.push("check_in <= $to");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT count() AS total FROM booking {where_clause}GROUP ALL"
        );
        let mut count_builder = self.db.query(&count_query);
        if let Some(establishment_id) = filter.establishment_id {
            count_builder =
                count_builder.bind(("establishment_id", establishment_id.to_string()));
        }
        if let Some(accommodation_id) = filter.accommodation_id {
            count_builder =
                count_builder.bind(("accommodation_id", accommodation_id.to_string()));
        }
        if let Some(client_id) = filter.client_id {
            count_builder = count_builder.bind(("client_id", client_id.to_string()));
        }
        if let Some(status) = filter.status {
            count_builder = count_builder.bind(("status", status.as_str()));
        }
        if let Some(kind) = filter.kind {
            count_builder = count_builder.bind(("kind", kind.as_str()));
        }
        if let Some(from) = filter.from {
            count_builder = count_builder.bind(("from", from));
        }
        if let Some(to) = filter.to {
            count_builder = count_builder.bind(("to", to));
        }

        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             {where_clause}ORDER BY check_in ASC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&list_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(establishment_id) = filter.establishment_id {
            builder = builder.bind(("establishment_id", establishment_id.to_string()));
        }
        if let Some(accommodation_id) = filter.accommodation_id {
            builder = builder.bind(("accommodation_id", accommodation_id.to_string()));
        }
        if let Some(client_id) = filter.client_id {
            builder = builder.bind(("client_id", client_id.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(kind) = filter.kind {
            builder = builder.bind(("kind", kind.as_str()));
        }
        if let Some(from) = filter.from {
            builder = builder.bind(("from", from));
        }
        if let Some(to) = filter.to {
            builder = builder.bind(("to", to));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_overlapping(
        &self,
        accommodation_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<Vec<Booking>> {
        let exclude_clause = if exclude.is_some() {
            "AND id != type::record('booking', $exclude) "
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE accommodation_id = $accommodation_id \
             AND status IN ['Pending', 'Confirmed'] \
             AND check_in < $to AND check_out > $from \
             {exclude_clause}ORDER BY check_in ASC"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("accommodation_id", accommodation_id.to_string()))
            .bind(("from", from))
            .bind(("to", to));
        if let Some(exclude) = exclude {
            builder = builder.bind(("exclude", exclude.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn find_walkins_on_day(
        &self,
        accommodation_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<Vec<Booking>> {
        let exclude_clause = if exclude.is_some() {
            "AND id != type::record('booking', $exclude) "
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE accommodation_id = $accommodation_id \
             AND kind = 'WalkIn' \
             AND status IN ['Pending', 'Confirmed'] \
             AND check_in >= $day_start AND check_in <= $day_end \
             {exclude_clause}ORDER BY check_in ASC"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("accommodation_id", accommodation_id.to_string()))
            .bind(("day_start", day_start))
            .bind(("day_end", day_end));
        if let Some(exclude) = exclude {
            builder = builder.bind(("exclude", exclude.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn find_active_at(
        &self,
        accommodation_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> InnkeepResult<Vec<Booking>> {
        let exclude_clause = if exclude.is_some() {
            "AND id != type::record('booking', $exclude) "
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE accommodation_id = $accommodation_id \
             AND status IN ['Pending', 'Confirmed'] \
             AND check_in <= $at AND check_out > $at \
             {exclude_clause}ORDER BY check_in ASC"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("accommodation_id", accommodation_id.to_string()))
            .bind(("at", at));
        if let Some(exclude) = exclude {
            builder = builder.bind(("exclude", exclude.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn code_exists(&self, code: &str) -> InnkeepResult<bool> {
        let code_owned = code.to_string();

        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM booking WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }
}

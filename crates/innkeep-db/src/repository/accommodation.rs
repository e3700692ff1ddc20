//! SurrealDB implementation of [`AccommodationRepository`].

use chrono::{DateTime, Utc};
use innkeep_core::error::InnkeepResult;
use innkeep_core::models::accommodation::{
    Accommodation, AccommodationKind, AccommodationStatus, BillingMode, CreateAccommodation,
    RateCard, UpdateAccommodation,
};
use innkeep_core::repository::{AccommodationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Nested rate-card object as stored on the record.
#[derive(Debug, Clone, SurrealValue)]
struct RateRow {
    base_price: i64,
    seasonal_price: Option<i64>,
    currency: String,
    billing_mode: String,
}

impl RateRow {
    fn from_rate(rate: &RateCard) -> Self {
        Self {
            base_price: rate.base_price,
            seasonal_price: rate.seasonal_price,
            currency: rate.currency.clone(),
            billing_mode: rate.billing_mode.as_str().into(),
        }
    }

    fn into_rate(self) -> Result<RateCard, DbError> {
        Ok(RateCard {
            base_price: self.base_price,
            seasonal_price: self.seasonal_price,
            currency: self.currency,
            billing_mode: parse_billing_mode(&self.billing_mode)?,
        })
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccommodationRow {
    establishment_id: String,
    name: String,
    kind: String,
    max_guests: u32,
    rate: RateRow,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccommodationRowWithId {
    record_id: String,
    establishment_id: String,
    name: String,
    kind: String,
    max_guests: u32,
    rate: RateRow,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<AccommodationKind, DbError> {
    match s {
        "Room" => Ok(AccommodationKind::Room),
        "Suite" => Ok(AccommodationKind::Suite),
        "House" => Ok(AccommodationKind::House),
        "Apartment" => Ok(AccommodationKind::Apartment),
        other => Err(DbError::Migration(format!(
            "unknown accommodation kind: {other}"
        ))),
    }
}

fn parse_status(s: &str) -> Result<AccommodationStatus, DbError> {
    match s {
        "Available" => Ok(AccommodationStatus::Available),
        "Reserved" => Ok(AccommodationStatus::Reserved),
        "Occupied" => Ok(AccommodationStatus::Occupied),
        "Maintenance" => Ok(AccommodationStatus::Maintenance),
        other => Err(DbError::Migration(format!(
            "unknown accommodation status: {other}"
        ))),
    }
}

fn parse_billing_mode(s: &str) -> Result<BillingMode, DbError> {
    match s {
        "Nightly" => Ok(BillingMode::Nightly),
        "Monthly" => Ok(BillingMode::Monthly),
        "Hourly" => Ok(BillingMode::Hourly),
        other => Err(DbError::Migration(format!(
            "unknown billing mode: {other}"
        ))),
    }
}

impl AccommodationRow {
    fn into_accommodation(self, id: Uuid) -> Result<Accommodation, DbError> {
        let establishment_id = Uuid::parse_str(&self.establishment_id)
            .map_err(|e| DbError::Migration(format!("invalid establishment UUID: {e}")))?;
        Ok(Accommodation {
            id,
            establishment_id,
            name: self.name,
            kind: parse_kind(&self.kind)?,
            max_guests: self.max_guests,
            rate: self.rate.into_rate()?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccommodationRowWithId {
    fn try_into_accommodation(self) -> Result<Accommodation, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let establishment_id = Uuid::parse_str(&self.establishment_id)
            .map_err(|e| DbError::Migration(format!("invalid establishment UUID: {e}")))?;
        Ok(Accommodation {
            id,
            establishment_id,
            name: self.name,
            kind: parse_kind(&self.kind)?,
            max_guests: self.max_guests,
            rate: self.rate.into_rate()?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Accommodation repository.
#[derive(Clone)]
pub struct SurrealAccommodationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccommodationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccommodationRepository for SurrealAccommodationRepository<C> {
    async fn create(&self, input: CreateAccommodation) -> InnkeepResult<Accommodation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // New units start Available; status moves only through the
        // lifecycle service afterwards.
        let result = self
            .db
            .query(
                "CREATE type::record('accommodation', $id) SET \
                 establishment_id = $establishment_id, \
                 name = $name, kind = $kind, \
                 max_guests = $max_guests, rate = $rate, \
                 status = 'Available'",
            )
            .bind(("id", id_str.clone()))
            .bind(("establishment_id", input.establishment_id.to_string()))
            .bind(("name", input.name))
            .bind(("kind", input.kind.as_str()))
            .bind(("max_guests", input.max_guests))
            .bind(("rate", RateRow::from_rate(&input.rate)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccommodationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "accommodation".into(),
            id: id_str,
        })?;

        Ok(row.into_accommodation(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> InnkeepResult<Accommodation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('accommodation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccommodationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "accommodation".into(),
            id: id_str,
        })?;

        Ok(row.into_accommodation(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateAccommodation) -> InnkeepResult<Accommodation> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.kind.is_some() {
            sets.push("kind = $kind");
        }
        if input.max_guests.is_some() {
            sets.push("max_guests = $max_guests");
        }
        if input.rate.is_some() {
            sets.push("rate = $rate");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('accommodation', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(kind) = input.kind {
            builder = builder.bind(("kind", kind.as_str()));
        }
        if let Some(max_guests) = input.max_guests {
            builder = builder.bind(("max_guests", max_guests));
        }
        if let Some(rate) = input.rate {
            builder = builder.bind(("rate", RateRow::from_rate(&rate)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccommodationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "accommodation".into(),
            id: id_str,
        })?;

        Ok(row.into_accommodation(id)?)
    }

    async fn set_status(&self, id: Uuid, status: AccommodationStatus) -> InnkeepResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('accommodation', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccommodationRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "accommodation".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list_by_establishment(
        &self,
        establishment_id: Uuid,
        pagination: Pagination,
    ) -> InnkeepResult<PaginatedResult<Accommodation>> {
        let est_str = establishment_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM accommodation \
                 WHERE establishment_id = $establishment_id GROUP ALL",
            )
            .bind(("establishment_id", est_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM accommodation \
                 WHERE establishment_id = $establishment_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("establishment_id", est_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccommodationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_accommodation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

//! SurrealDB implementation of [`EstablishmentRepository`].

use chrono::{DateTime, Utc};
use innkeep_core::error::InnkeepResult;
use innkeep_core::models::establishment::{
    CreateEstablishment, Establishment, PricingMode, UpdateEstablishment,
};
use innkeep_core::repository::{EstablishmentRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct EstablishmentRow {
    name: String,
    slug: String,
    active: bool,
    total_capacity: u32,
    pricing_mode: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct EstablishmentRowWithId {
    record_id: String,
    name: String,
    slug: String,
    active: bool,
    total_capacity: u32,
    pricing_mode: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_pricing_mode(s: &str) -> Result<PricingMode, DbError> {
    match s {
        "Nightly" => Ok(PricingMode::Nightly),
        "Monthly" => Ok(PricingMode::Monthly),
        other => Err(DbError::Migration(format!(
            "unknown pricing mode: {other}"
        ))),
    }
}

impl EstablishmentRow {
    fn into_establishment(self, id: Uuid) -> Result<Establishment, DbError> {
        Ok(Establishment {
            id,
            name: self.name,
            slug: self.slug,
            active: self.active,
            total_capacity: self.total_capacity,
            pricing_mode: parse_pricing_mode(&self.pricing_mode)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EstablishmentRowWithId {
    fn try_into_establishment(self) -> Result<Establishment, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Establishment {
            id,
            name: self.name,
            slug: self.slug,
            active: self.active,
            total_capacity: self.total_capacity,
            pricing_mode: parse_pricing_mode(&self.pricing_mode)?,
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

/// SurrealDB implementation of the Establishment repository.
#[derive(Clone)]
pub struct SurrealEstablishmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEstablishmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EstablishmentRepository for SurrealEstablishmentRepository<C> {
    async fn create(&self, input: CreateEstablishment) -> InnkeepResult<Establishment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('establishment', $id) SET \
                 name = $name, slug = $slug, active = true, \
                 total_capacity = $total_capacity, \
                 pricing_mode = $pricing_mode",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("total_capacity", input.total_capacity))
            .bind(("pricing_mode", input.pricing_mode.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EstablishmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "establishment".into(),
            id: id_str,
        })?;

        Ok(row.into_establishment(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> InnkeepResult<Establishment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('establishment', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EstablishmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "establishment".into(),
            id: id_str,
        })?;

        Ok(row.into_establishment(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> InnkeepResult<Establishment> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM establishment WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EstablishmentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "establishment".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_establishment()?)
    }

    async fn update(&self, id: Uuid, input: UpdateEstablishment) -> InnkeepResult<Establishment> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if input.total_capacity.is_some() {
            sets.push("total_capacity = $total_capacity");
        }
        if input.pricing_mode.is_some() {
            sets.push("pricing_mode = $pricing_mode");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('establishment', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }
        if let Some(total_capacity) = input.total_capacity {
            builder = builder.bind(("total_capacity", total_capacity));
        }
        if let Some(pricing_mode) = input.pricing_mode {
            builder = builder.bind(("pricing_mode", pricing_mode.as_str()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EstablishmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "establishment".into(),
            id: id_str,
        })?;

        Ok(row.into_establishment(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> InnkeepResult<()> {
        self.db
            .query(
                "UPDATE type::record('establishment', $id) SET \
                 active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> InnkeepResult<PaginatedResult<Establishment>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM establishment GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM establishment \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EstablishmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_establishment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

//! SurrealDB implementation of [`ClientRepository`].

use chrono::{DateTime, Utc};
use innkeep_core::error::InnkeepResult;
use innkeep_core::models::client::{Client, CreateClient};
use innkeep_core::repository::{ClientRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ClientRow {
    email: String,
    full_name: String,
    phone: Option<String>,
    booking_ids: Vec<String>,
    total_stays: u32,
    total_spent: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ClientRowWithId {
    record_id: String,
    email: String,
    full_name: String,
    phone: Option<String>,
    booking_ids: Vec<String>,
    total_stays: u32,
    total_spent: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_booking_ids(raw: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    raw.iter()
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|e| DbError::Migration(format!("invalid booking UUID: {e}")))
        })
        .collect()
}

impl ClientRow {
    fn into_client(self, id: Uuid) -> Result<Client, DbError> {
        Ok(Client {
            id,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            booking_ids: parse_booking_ids(self.booking_ids)?,
            total_stays: self.total_stays,
            total_spent: self.total_spent,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ClientRowWithId {
    fn try_into_client(self) -> Result<Client, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Client {
            id,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            booking_ids: parse_booking_ids(self.booking_ids)?,
            total_stays: self.total_stays,
            total_spent: self.total_spent,
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

/// SurrealDB implementation of the Client repository.
#[derive(Clone)]
pub struct SurrealClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ClientRepository for SurrealClientRepository<C> {
    async fn create(&self, input: CreateClient) -> InnkeepResult<Client> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 email = $email, full_name = $full_name, \
                 phone = $phone, booking_ids = [], \
                 total_stays = 0, total_spent = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("full_name", input.full_name))
            .bind(("phone", input.phone))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: id_str,
        })?;

        Ok(row.into_client(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> InnkeepResult<Client> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('client', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: id_str,
        })?;

        Ok(row.into_client(id)?)
    }

    async fn get_by_email(&self, email: &str) -> InnkeepResult<Client> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM client WHERE email = $email",
            )
            .bind(("email", email_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_client()?)
    }

    async fn append_booking(&self, id: Uuid, booking_id: Uuid) -> InnkeepResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('client', $id) SET \
                 booking_ids += $booking_id, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("booking_id", booking_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "client".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn record_completion(&self, id: Uuid, amount: i64) -> InnkeepResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('client', $id) SET \
                 total_stays += 1, total_spent += $amount, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("amount", amount))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "client".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> InnkeepResult<PaginatedResult<Client>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM client GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM client \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_client())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Establishments (global scope)
-- =======================================================================
DEFINE TABLE establishment SCHEMAFULL;
DEFINE FIELD name ON TABLE establishment TYPE string;
DEFINE FIELD slug ON TABLE establishment TYPE string;
DEFINE FIELD active ON TABLE establishment TYPE bool DEFAULT true;
DEFINE FIELD total_capacity ON TABLE establishment TYPE int;
DEFINE FIELD pricing_mode ON TABLE establishment TYPE string \
    ASSERT $value IN ['Nightly', 'Monthly'];
DEFINE FIELD created_at ON TABLE establishment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE establishment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_establishment_slug ON TABLE establishment \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Accommodations (establishment scope)
-- =======================================================================
DEFINE TABLE accommodation SCHEMAFULL;
DEFINE FIELD establishment_id ON TABLE accommodation TYPE string;
DEFINE FIELD name ON TABLE accommodation TYPE string;
DEFINE FIELD kind ON TABLE accommodation TYPE string \
    ASSERT $value IN ['Room', 'Suite', 'House', 'Apartment'];
DEFINE FIELD max_guests ON TABLE accommodation TYPE int;
DEFINE FIELD rate ON TABLE accommodation TYPE object;
DEFINE FIELD rate.base_price ON TABLE accommodation TYPE int;
DEFINE FIELD rate.seasonal_price ON TABLE accommodation TYPE option<int>;
DEFINE FIELD rate.currency ON TABLE accommodation TYPE string;
DEFINE FIELD rate.billing_mode ON TABLE accommodation TYPE string \
    ASSERT $value IN ['Nightly', 'Monthly', 'Hourly'];
DEFINE FIELD status ON TABLE accommodation TYPE string \
    ASSERT $value IN ['Available', 'Reserved', 'Occupied', \
    'Maintenance'];
DEFINE FIELD created_at ON TABLE accommodation TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE accommodation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_accommodation_establishment ON TABLE accommodation \
    COLUMNS establishment_id;

-- =======================================================================
-- Bookings
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD code ON TABLE booking TYPE string;
DEFINE FIELD establishment_id ON TABLE booking TYPE string;
DEFINE FIELD accommodation_id ON TABLE booking TYPE string;
DEFINE FIELD client_id ON TABLE booking TYPE string;
DEFINE FIELD kind ON TABLE booking TYPE string \
    ASSERT $value IN ['Online', 'Onsite', 'WalkIn'];
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Completed', \
    'Cancelled'];
DEFINE FIELD payment_status ON TABLE booking TYPE string \
    ASSERT $value IN ['Unpaid', 'Partial', 'Paid'];
DEFINE FIELD check_in ON TABLE booking TYPE datetime;
DEFINE FIELD check_out ON TABLE booking TYPE datetime;
DEFINE FIELD guests ON TABLE booking TYPE int;
DEFINE FIELD contact ON TABLE booking TYPE object;
DEFINE FIELD contact.full_name ON TABLE booking TYPE string;
DEFINE FIELD contact.email ON TABLE booking TYPE string;
DEFINE FIELD contact.phone ON TABLE booking TYPE option<string>;
DEFINE FIELD companions ON TABLE booking TYPE array<string> DEFAULT [];
DEFINE FIELD pricing ON TABLE booking TYPE object;
DEFINE FIELD pricing.mode ON TABLE booking TYPE string \
    ASSERT $value IN ['Nightly', 'Monthly', 'Hourly'];
DEFINE FIELD pricing.unit_price ON TABLE booking TYPE int;
DEFINE FIELD pricing.quantity ON TABLE booking TYPE int;
DEFINE FIELD pricing.subtotal ON TABLE booking TYPE int;
DEFINE FIELD pricing.total ON TABLE booking TYPE int;
DEFINE FIELD pricing.currency ON TABLE booking TYPE string;
DEFINE FIELD created_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_booking_code ON TABLE booking COLUMNS code UNIQUE;
DEFINE INDEX idx_booking_accommodation ON TABLE booking \
    COLUMNS accommodation_id;
DEFINE INDEX idx_booking_establishment ON TABLE booking \
    COLUMNS establishment_id;

-- =======================================================================
-- Clients (guest directory)
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD email ON TABLE client TYPE string;
DEFINE FIELD full_name ON TABLE client TYPE string;
DEFINE FIELD phone ON TABLE client TYPE option<string>;
DEFINE FIELD booking_ids ON TABLE client TYPE array<string> DEFAULT [];
DEFINE FIELD total_stays ON TABLE client TYPE int DEFAULT 0;
DEFINE FIELD total_spent ON TABLE client TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_client_email ON TABLE client COLUMNS email UNIQUE;
";

/// Run all pending migrations against the given database connection.
///
/// Idempotent: applied versions are tracked in the `_migration` table
/// and skipped on subsequent runs.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

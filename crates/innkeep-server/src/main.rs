//! Innkeep Server — application entry point.

use std::sync::Arc;
use std::time::Duration;

use innkeep_booking::{BookingConfig, BookingService};
use innkeep_db::repository::{
    SurrealAccommodationRepository, SurrealBookingRepository, SurrealClientRepository,
    SurrealEstablishmentRepository,
};
use innkeep_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("innkeep=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Innkeep server...");

    let config = DbConfig::from_env();
    let db = match DbManager::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            return;
        }
    };

    if let Err(e) = innkeep_db::run_migrations(db.client()).await {
        tracing::error!(error = %e, "migrations failed");
        return;
    }

    let service = Arc::new(BookingService::new(
        SurrealEstablishmentRepository::new(db.client().clone()),
        SurrealAccommodationRepository::new(db.client().clone()),
        SurrealBookingRepository::new(db.client().clone()),
        SurrealClientRepository::new(db.client().clone()),
        BookingConfig::default(),
    ));

    // Code-pool refill runs independently of allocation requests; a
    // failed refill only degrades allocation to its fallback path.
    let refill = Arc::clone(&service);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(30));
        loop {
            tick.tick().await;
            if refill.allocator().needs_refill() {
                if let Err(e) = refill.allocator().refill().await {
                    tracing::warn!(error = %e, "code pool refill failed");
                }
            }
        }
    });

    // TODO: mount the HTTP API layer on top of `service`.
    let _ = tokio::signal::ctrl_c().await;

    tracing::info!("Innkeep server stopped.");
}

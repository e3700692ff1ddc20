//! SurrealDB repository implementations.

mod accommodation;
mod booking;
mod client;
mod establishment;

pub use accommodation::SurrealAccommodationRepository;
pub use booking::SurrealBookingRepository;
pub use client::SurrealClientRepository;
pub use establishment::SurrealEstablishmentRepository;

//! Innkeep Booking — the booking engine: availability checking,
//! pricing, booking-code allocation, and the booking lifecycle
//! service.
//!
//! Everything here is generic over the `innkeep-core` repository
//! traits, so the engine has no dependency on the database crate.

pub mod allocator;
pub mod availability;
pub mod config;
pub mod error;
pub mod pricing;
pub mod service;

pub use allocator::CodeAllocator;
pub use availability::AvailabilityChecker;
pub use config::BookingConfig;
pub use error::BookingError;
pub use service::{BookingPatch, BookingService, CreateBookingRequest};

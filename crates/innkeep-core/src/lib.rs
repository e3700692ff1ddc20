//! Innkeep Core — domain models, access scope resolution, error
//! taxonomy, and repository trait definitions for the booking engine.
//!
//! This crate has no database or transport dependencies; the engine
//! crate (`innkeep-booking`) and the storage crate (`innkeep-db`) both
//! build on the types defined here.

pub mod error;
pub mod models;
pub mod repository;
pub mod scope;

pub use error::{InnkeepError, InnkeepResult};
pub use scope::{AccessScope, Role, resolve_scope};

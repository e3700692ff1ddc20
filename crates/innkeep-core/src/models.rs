//! Domain models for the lodging platform.
//!
//! These are the core types shared across all crates. Each entity
//! follows the same convention: the entity struct plus `CreateX` and
//! `UpdateX` companions for repository inputs.

pub mod accommodation;
pub mod booking;
pub mod client;
pub mod establishment;

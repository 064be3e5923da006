//! Maintenance scheduling domain logic.
//!
//! This crate has no internal dependencies and no database access. The
//! `db` crate provides the production [`store::BaselineStore`]; everything
//! else here operates on values passed in by the caller.

pub mod baseline;
pub mod config;
pub mod error;
pub mod inspection;
pub mod memory_store;
pub mod resolver;
pub mod schedule;
pub mod store;
pub mod types;

//! Row structs for the scheduler tables.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! the conversion into the corresponding `railfleet_core` type.

pub mod baseline;
pub mod inspection_type;

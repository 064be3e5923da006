//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async data access
//! methods that accept `&PgPool` as the first argument.

pub mod baseline_repo;
pub mod inspection_type_repo;

pub use baseline_repo::BaselineRepo;
pub use inspection_type_repo::InspectionTypeRepo;

//! Inspection type reference data.
//!
//! Inspection types are maintained by the catalog outside the engine and are
//! read-only here. The scheduler only needs the cycle length and the nominal
//! duration of each type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Longest supported inspection cycle (20 years).
pub const MAX_CYCLE_MONTHS: i32 = 240;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A category of required inspection (e.g. "Monthly brake check").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionType {
    pub id: DbId,
    pub name: String,
    pub category: String,
    /// Calendar months between two consecutive inspections.
    pub cycle_months: i32,
    /// Nominal number of days an inspection takes the vehicle out of service.
    pub duration_days: i32,
}

impl InspectionType {
    /// Check the cycle and duration are usable for projection.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_cycle_months(self.cycle_months)?;
        validate_duration_days(self.duration_days)
    }
}

/// Validate that a cycle length is positive and within [`MAX_CYCLE_MONTHS`].
pub fn validate_cycle_months(months: i32) -> Result<(), CoreError> {
    if months <= 0 {
        return Err(CoreError::Validation(format!(
            "cycle_months must be positive, got {months}"
        )));
    }
    if months > MAX_CYCLE_MONTHS {
        return Err(CoreError::Validation(format!(
            "cycle_months must not exceed {MAX_CYCLE_MONTHS}, got {months}"
        )));
    }
    Ok(())
}

/// Validate that a nominal duration is not negative.
pub fn validate_duration_days(days: i32) -> Result<(), CoreError> {
    if days < 0 {
        return Err(CoreError::Validation(format!(
            "duration_days must not be negative, got {days}"
        )));
    }
    Ok(())
}

/// Build an id lookup over a catalog slice.
pub fn index_by_id(types: &[InspectionType]) -> HashMap<DbId, &InspectionType> {
    types.iter().map(|t| (t.id, t)).collect()
}

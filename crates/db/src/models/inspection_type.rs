//! Inspection type row model.

use railfleet_core::inspection::InspectionType;
use railfleet_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `inspection_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectionTypeRow {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub cycle_months: i32,
    pub duration_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<InspectionTypeRow> for InspectionType {
    fn from(row: InspectionTypeRow) -> Self {
        InspectionType {
            id: row.id,
            name: row.name,
            category: row.category,
            cycle_months: row.cycle_months,
            duration_days: row.duration_days,
        }
    }
}

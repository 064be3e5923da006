//! Maintenance baseline row model.

use chrono::NaiveDate;
use railfleet_core::baseline::{BaselineRecord, BaselineSource};
use railfleet_core::error::CoreError;
use railfleet_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `maintenance_baselines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BaselineRow {
    pub id: DbId,
    pub vehicle_id: String,
    pub inspection_type_id: DbId,
    pub base_date: NaiveDate,
    pub source: String,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<BaselineRow> for BaselineRecord {
    type Error = CoreError;

    fn try_from(row: BaselineRow) -> Result<Self, Self::Error> {
        let source = BaselineSource::from_str_value(&row.source).map_err(|e| {
            CoreError::DataIntegrity(format!("maintenance_baselines row {}: {e}", row.id))
        })?;
        Ok(BaselineRecord {
            vehicle_id: row.vehicle_id,
            inspection_type_id: row.inspection_type_id,
            base_date: row.base_date,
            source,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

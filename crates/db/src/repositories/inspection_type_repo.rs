//! Repository for the `inspection_types` table.
//!
//! Read-only: the catalog is maintained by the fleet records application.

use railfleet_core::types::DbId;
use sqlx::PgPool;

use crate::models::inspection_type::InspectionTypeRow;

/// Column list for the `inspection_types` table.
const COLUMNS: &str = "id, name, category, cycle_months, duration_days, created_at, updated_at";

/// Provides read access to the inspection type catalog.
pub struct InspectionTypeRepo;

impl InspectionTypeRepo {
    /// List every inspection type, ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<InspectionTypeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inspection_types ORDER BY id");
        sqlx::query_as::<_, InspectionTypeRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find an inspection type by its id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InspectionTypeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inspection_types WHERE id = $1");
        sqlx::query_as::<_, InspectionTypeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `maintenance_baselines` table.
//!
//! One row per (vehicle, inspection type); writes go through a single
//! `INSERT ... ON CONFLICT DO UPDATE` so each key is updated atomically.

use chrono::NaiveDate;
use railfleet_core::types::DbId;
use sqlx::PgPool;

use crate::models::baseline::BaselineRow;

/// Column list for the `maintenance_baselines` table.
const COLUMNS: &str = "id, vehicle_id, inspection_type_id, base_date, source, notes, \
                       created_at, updated_at";

/// Provides data access for resolved maintenance baselines.
pub struct BaselineRepo;

impl BaselineRepo {
    /// Find the baseline for one (vehicle, inspection type) pair.
    pub async fn find(
        pool: &PgPool,
        vehicle_id: &str,
        inspection_type_id: DbId,
    ) -> Result<Option<BaselineRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_baselines \
             WHERE vehicle_id = $1 AND inspection_type_id = $2"
        );
        sqlx::query_as::<_, BaselineRow>(&query)
            .bind(vehicle_id)
            .bind(inspection_type_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a baseline or replace date, source and notes of the existing
    /// one. `created_at` is kept; `updated_at` is bumped.
    pub async fn upsert(
        pool: &PgPool,
        vehicle_id: &str,
        inspection_type_id: DbId,
        base_date: NaiveDate,
        source: &str,
        notes: &str,
    ) -> Result<BaselineRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_baselines \
                (vehicle_id, inspection_type_id, base_date, source, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (vehicle_id, inspection_type_id) \
             DO UPDATE SET base_date = EXCLUDED.base_date, \
                           source = EXCLUDED.source, \
                           notes = EXCLUDED.notes, \
                           updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BaselineRow>(&query)
            .bind(vehicle_id)
            .bind(inspection_type_id)
            .bind(base_date)
            .bind(source)
            .bind(notes)
            .fetch_one(pool)
            .await
    }

    /// List all baselines of one vehicle, ordered by inspection type.
    pub async fn list_for_vehicle(
        pool: &PgPool,
        vehicle_id: &str,
    ) -> Result<Vec<BaselineRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_baselines \
             WHERE vehicle_id = $1 \
             ORDER BY inspection_type_id"
        );
        sqlx::query_as::<_, BaselineRow>(&query)
            .bind(vehicle_id)
            .fetch_all(pool)
            .await
    }

    /// List baselines, optionally restricted to vehicles of one office
    /// and/or an explicit set of vehicles.
    ///
    /// Vehicles without a `vehicles` row never match an office filter.
    pub async fn list_scoped(
        pool: &PgPool,
        office_id: Option<DbId>,
        vehicle_ids: Option<&[String]>,
    ) -> Result<Vec<BaselineRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_baselines b \
             WHERE ($1::BIGINT IS NULL OR EXISTS ( \
                    SELECT 1 FROM vehicles v \
                    WHERE v.id = b.vehicle_id AND v.office_id = $1)) \
               AND ($2::TEXT[] IS NULL OR b.vehicle_id = ANY($2)) \
             ORDER BY b.vehicle_id, b.inspection_type_id"
        );
        sqlx::query_as::<_, BaselineRow>(&query)
            .bind(office_id)
            .bind(vehicle_ids)
            .fetch_all(pool)
            .await
    }
}

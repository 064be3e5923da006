//! PostgreSQL-backed [`BaselineStore`].

use railfleet_core::baseline::{BaselineRecord, BaselineUpsert};
use railfleet_core::error::CoreError;
use railfleet_core::store::{BaselineScope, BaselineStore};
use railfleet_core::types::DbId;

use crate::repositories::BaselineRepo;
use crate::DbPool;

/// Baseline store over the `maintenance_baselines` table.
///
/// Cheap to clone: the pool is reference counted. The pool is opened by the
/// caller and closed by the caller; this type never creates one.
#[derive(Debug, Clone)]
pub struct PgBaselineStore {
    pool: DbPool,
}

impl PgBaselineStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a driver error to the persistence variant.
fn persistence(operation: &'static str, err: sqlx::Error) -> CoreError {
    tracing::error!(operation, error = %err, "Baseline store query failed");
    CoreError::Persistence(format!("{operation}: {err}"))
}

impl BaselineStore for PgBaselineStore {
    async fn get(
        &self,
        vehicle_id: &str,
        inspection_type_id: DbId,
    ) -> Result<Option<BaselineRecord>, CoreError> {
        BaselineRepo::find(&self.pool, vehicle_id, inspection_type_id)
            .await
            .map_err(|e| persistence("get", e))?
            .map(BaselineRecord::try_from)
            .transpose()
    }

    async fn upsert(&self, record: &BaselineUpsert) -> Result<BaselineRecord, CoreError> {
        let row = BaselineRepo::upsert(
            &self.pool,
            &record.vehicle_id,
            record.inspection_type_id,
            record.base_date,
            record.source.as_str(),
            &record.notes,
        )
        .await
        .map_err(|e| persistence("upsert", e))?;
        BaselineRecord::try_from(row)
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<BaselineRecord>, CoreError> {
        BaselineRepo::list_for_vehicle(&self.pool, vehicle_id)
            .await
            .map_err(|e| persistence("list_for_vehicle", e))?
            .into_iter()
            .map(BaselineRecord::try_from)
            .collect()
    }

    async fn list(&self, scope: &BaselineScope) -> Result<Vec<BaselineRecord>, CoreError> {
        BaselineRepo::list_scoped(&self.pool, scope.office_id, scope.vehicle_ids.as_deref())
            .await
            .map_err(|e| persistence("list", e))?
            .into_iter()
            .map(BaselineRecord::try_from)
            .collect()
    }
}

//! In-process [`BaselineStore`] backed by a locked ordered map.
//!
//! Used by tests and for running the engine without a database. Office
//! scoping needs a vehicle -> office assignment, registered with
//! [`InMemoryBaselineStore::assign_office`].

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::baseline::{BaselineRecord, BaselineUpsert};
use crate::error::CoreError;
use crate::store::{BaselineScope, BaselineStore};
use crate::types::{DbId, VehicleId};

/// Composite key: (vehicle_id, inspection_type_id).
type BaselineKey = (VehicleId, DbId);

#[derive(Debug, Default)]
pub struct InMemoryBaselineStore {
    records: RwLock<BTreeMap<BaselineKey, BaselineRecord>>,
    offices: RwLock<HashMap<VehicleId, DbId>>,
}

impl InMemoryBaselineStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which office a vehicle belongs to, for office-scoped listings.
    pub async fn assign_office(&self, vehicle_id: impl Into<VehicleId>, office_id: DbId) {
        self.offices.write().await.insert(vehicle_id.into(), office_id);
    }

    /// Number of stored baselines.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl BaselineStore for InMemoryBaselineStore {
    async fn get(
        &self,
        vehicle_id: &str,
        inspection_type_id: DbId,
    ) -> Result<Option<BaselineRecord>, CoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(vehicle_id.to_string(), inspection_type_id))
            .cloned())
    }

    async fn upsert(&self, record: &BaselineUpsert) -> Result<BaselineRecord, CoreError> {
        // The write lock is held across the read-modify-write so the update
        // for one key is never interleaved with another.
        let mut records = self.records.write().await;
        let now = Utc::now();
        let key = (record.vehicle_id.clone(), record.inspection_type_id);

        let stored = records
            .entry(key)
            .and_modify(|existing| {
                existing.base_date = record.base_date;
                existing.source = record.source;
                existing.notes = record.notes.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| BaselineRecord {
                vehicle_id: record.vehicle_id.clone(),
                inspection_type_id: record.inspection_type_id,
                base_date: record.base_date,
                source: record.source,
                notes: record.notes.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(stored.clone())
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<BaselineRecord>, CoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn list(&self, scope: &BaselineScope) -> Result<Vec<BaselineRecord>, CoreError> {
        let offices = self.offices.read().await;
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| scope.admits_vehicle(&r.vehicle_id))
            .filter(|r| match scope.office_id {
                Some(office_id) => offices.get(&r.vehicle_id) == Some(&office_id),
                None => true,
            })
            .cloned()
            .collect())
    }
}

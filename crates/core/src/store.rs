//! The baseline persistence seam.
//!
//! [`BaselineStore`] is the only writer of baseline state. The production
//! implementation lives in the `db` crate; [`crate::memory_store`] provides
//! an in-process implementation for tests and local runs.

use std::future::Future;

use crate::baseline::{BaselineRecord, BaselineUpsert};
use crate::error::CoreError;
use crate::types::{DbId, VehicleId};

/// Restricts which baselines a listing returns. An empty scope means the
/// whole fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineScope {
    /// Only vehicles assigned to this office.
    pub office_id: Option<DbId>,
    /// Only these vehicles.
    pub vehicle_ids: Option<Vec<VehicleId>>,
}

impl BaselineScope {
    /// Scope covering a single vehicle.
    pub fn vehicle(vehicle_id: impl Into<VehicleId>) -> Self {
        Self {
            office_id: None,
            vehicle_ids: Some(vec![vehicle_id.into()]),
        }
    }

    /// Whether `vehicle_id` passes the vehicle-list part of the scope.
    pub fn admits_vehicle(&self, vehicle_id: &str) -> bool {
        self.vehicle_ids
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|id| id == vehicle_id))
    }
}

/// Keyed storage of one [`BaselineRecord`] per (vehicle, inspection type).
///
/// Implementations must make `upsert` atomic per key: two concurrent upserts
/// for the same pair never produce a record mixing fields from both. Storage
/// failures are reported as [`CoreError::Persistence`] and never retried here.
pub trait BaselineStore: Send + Sync {
    /// Fetch the baseline for a pair, if one exists.
    fn get(
        &self,
        vehicle_id: &str,
        inspection_type_id: DbId,
    ) -> impl Future<Output = Result<Option<BaselineRecord>, CoreError>> + Send;

    /// Insert the baseline, or replace base date, source, notes and
    /// `updated_at` of the existing one. Returns the stored record.
    fn upsert(
        &self,
        record: &BaselineUpsert,
    ) -> impl Future<Output = Result<BaselineRecord, CoreError>> + Send;

    /// All baselines of one vehicle, ordered by inspection type id.
    fn list_for_vehicle(
        &self,
        vehicle_id: &str,
    ) -> impl Future<Output = Result<Vec<BaselineRecord>, CoreError>> + Send;

    /// All baselines within `scope`, ordered by vehicle id then inspection
    /// type id.
    fn list(
        &self,
        scope: &BaselineScope,
    ) -> impl Future<Output = Result<Vec<BaselineRecord>, CoreError>> + Send;
}

//! Query parameter types for the schedule endpoints.

use chrono::NaiveDate;
use railfleet_core::schedule::ScheduleFilter;
use railfleet_core::store::BaselineScope;
use railfleet_core::types::DbId;
use serde::Deserialize;

/// `GET /maintenance/schedule` parameters.
///
/// `as_of` defaults to today's UTC date when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleParams {
    pub as_of: Option<NaiveDate>,
    pub office_id: Option<DbId>,
    pub vehicle_id: Option<String>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    #[serde(default)]
    pub warning_only: bool,
}

impl ScheduleParams {
    pub fn scope(&self) -> BaselineScope {
        BaselineScope {
            office_id: self.office_id,
            vehicle_ids: self.vehicle_id.clone().map(|v| vec![v]),
        }
    }

    pub fn filter(&self) -> ScheduleFilter {
        ScheduleFilter {
            due_from: self.due_from,
            due_to: self.due_to,
            warning_only: self.warning_only,
        }
    }
}

/// Parameters accepted by per-vehicle schedule endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
    pub as_of: Option<NaiveDate>,
}

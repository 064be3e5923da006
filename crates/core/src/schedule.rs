//! Due-date projection.
//!
//! Joins resolved baselines with inspection cycles to compute the next due
//! date, the days remaining relative to a caller-supplied `as_of` date, and
//! the warning flag. Nothing here reads the clock or caches results: days
//! remaining change every day.

use std::cmp::Ordering;

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::baseline::{BaselineRecord, BaselineSource};
use crate::error::CoreError;
use crate::inspection::{index_by_id, validate_cycle_months, InspectionType};
use crate::store::{BaselineScope, BaselineStore};
use crate::types::{DbId, VehicleId};

// ---------------------------------------------------------------------------
// Warning threshold
// ---------------------------------------------------------------------------

/// Configuration value selecting the per-inspection threshold.
pub const THRESHOLD_DURATION: &str = "duration";

/// When a projection counts as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "days")]
pub enum WarningThreshold {
    /// Warn when the due date is at most this many days away, fleet-wide.
    Fixed(u32),
    /// Warn when the due date is at most the inspection's own
    /// `duration_days` away.
    InspectionDuration,
}

impl WarningThreshold {
    /// Parse `"duration"` or a non-negative number of days.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s == THRESHOLD_DURATION {
            return Ok(Self::InspectionDuration);
        }
        s.parse::<u32>().map(Self::Fixed).map_err(|_| {
            format!(
                "Invalid warning threshold '{s}'. \
                 Must be '{THRESHOLD_DURATION}' or a non-negative number of days"
            )
        })
    }

    /// Threshold in days for one inspection type.
    pub fn days_for(&self, inspection_type: &InspectionType) -> i64 {
        match self {
            Self::Fixed(days) => i64::from(*days),
            Self::InspectionDuration => i64::from(inspection_type.duration_days),
        }
    }
}

// ---------------------------------------------------------------------------
// Projection types
// ---------------------------------------------------------------------------

/// Coarse classification of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Ok,
    DueSoon,
    Overdue,
}

/// Next due date for one (vehicle, inspection type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleProjection {
    pub vehicle_id: VehicleId,
    pub inspection_type_id: DbId,
    pub inspection_name: String,
    pub category: String,
    pub base_date: NaiveDate,
    pub source: BaselineSource,
    pub next_date: NaiveDate,
    /// Negative when overdue, zero on the due date.
    pub days_until: i64,
    pub is_warning: bool,
    pub status: DueStatus,
}

/// A baseline that could not be projected because its inspection type is
/// missing from the catalog or has an unusable cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    pub vehicle_id: VehicleId,
    pub inspection_type_id: DbId,
    pub message: String,
}

/// Ordered projections plus the baselines that had to be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionReport {
    pub projections: Vec<ScheduleProjection>,
    pub integrity_errors: Vec<IntegrityIssue>,
}

/// Counts over a report's projections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub total: usize,
    pub warning: usize,
    pub overdue: usize,
    pub integrity_errors: usize,
}

impl ProjectionReport {
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            total: self.projections.len(),
            warning: self.projections.iter().filter(|p| p.is_warning).count(),
            overdue: self
                .projections
                .iter()
                .filter(|p| p.status == DueStatus::Overdue)
                .count(),
            integrity_errors: self.integrity_errors.len(),
        }
    }

    /// Keep only the projections matching `filter`. Order is preserved.
    pub fn retain(&mut self, filter: &ScheduleFilter) {
        self.projections.retain(|p| filter.matches(p));
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Post-projection filter over due dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    /// Inclusive lower bound on `next_date`.
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound on `next_date`.
    pub due_to: Option<NaiveDate>,
    pub warning_only: bool,
}

impl ScheduleFilter {
    /// Reject windows whose bounds are reversed.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(from), Some(to)) = (self.due_from, self.due_to) {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "due_from ({from}) must not be after due_to ({to})"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, projection: &ScheduleProjection) -> bool {
        if self.warning_only && !projection.is_warning {
            return false;
        }
        if self.due_from.is_some_and(|from| projection.next_date < from) {
            return false;
        }
        if self.due_to.is_some_and(|to| projection.next_date > to) {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Date arithmetic
// ---------------------------------------------------------------------------

/// Add calendar months, clamping the day to the end of the target month
/// (2024-01-31 + 1 month = 2024-02-29).
pub fn add_cycle(base: NaiveDate, months: i32) -> Result<NaiveDate, CoreError> {
    validate_cycle_months(months)?;
    let months = months.unsigned_abs();
    base.checked_add_months(Months::new(months)).ok_or_else(|| {
        CoreError::Validation(format!("{base} + {months} months is out of range"))
    })
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// Computes schedule projections under a configured warning threshold.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleProjector {
    threshold: WarningThreshold,
}

impl ScheduleProjector {
    pub fn new(threshold: WarningThreshold) -> Self {
        Self { threshold }
    }

    /// Project a single baseline.
    ///
    /// An inspection type with an unusable cycle or duration is a
    /// [`CoreError::DataIntegrity`] error.
    pub fn project(
        &self,
        baseline: &BaselineRecord,
        inspection_type: &InspectionType,
        as_of: NaiveDate,
    ) -> Result<ScheduleProjection, CoreError> {
        let next_date = inspection_type
            .validate()
            .and_then(|()| add_cycle(baseline.base_date, inspection_type.cycle_months))
            .map_err(|e| unusable_type(inspection_type, e))?;
        let days_until = days_between(as_of, next_date);
        let is_warning = days_until <= self.threshold.days_for(inspection_type);
        let status = if days_until < 0 {
            DueStatus::Overdue
        } else if is_warning {
            DueStatus::DueSoon
        } else {
            DueStatus::Ok
        };

        Ok(ScheduleProjection {
            vehicle_id: baseline.vehicle_id.clone(),
            inspection_type_id: baseline.inspection_type_id,
            inspection_name: inspection_type.name.clone(),
            category: inspection_type.category.clone(),
            base_date: baseline.base_date,
            source: baseline.source,
            next_date,
            days_until,
            is_warning,
            status,
        })
    }

    /// Project every baseline, soonest (or most overdue) first.
    ///
    /// Ties are broken by vehicle id, then inspection type id. Baselines
    /// that cannot be projected are reported in `integrity_errors` and left
    /// out; they never abort the listing.
    pub fn project_all(
        &self,
        baselines: &[BaselineRecord],
        inspection_types: &[InspectionType],
        as_of: NaiveDate,
    ) -> ProjectionReport {
        let catalog = index_by_id(inspection_types);
        let mut report = ProjectionReport::default();

        for baseline in baselines {
            let Some(inspection_type) = catalog.get(&baseline.inspection_type_id) else {
                let issue = IntegrityIssue {
                    vehicle_id: baseline.vehicle_id.clone(),
                    inspection_type_id: baseline.inspection_type_id,
                    message: format!(
                        "baseline for vehicle {} references unknown inspection type {}",
                        baseline.vehicle_id, baseline.inspection_type_id
                    ),
                };
                tracing::warn!(
                    vehicle_id = %issue.vehicle_id,
                    inspection_type_id = issue.inspection_type_id,
                    "Skipping baseline with dangling inspection type",
                );
                report.integrity_errors.push(issue);
                continue;
            };

            match self.project(baseline, inspection_type, as_of) {
                Ok(projection) => report.projections.push(projection),
                Err(e) => {
                    tracing::warn!(
                        vehicle_id = %baseline.vehicle_id,
                        inspection_type_id = baseline.inspection_type_id,
                        error = %e,
                        "Skipping baseline that cannot be projected",
                    );
                    let message = match e {
                        CoreError::DataIntegrity(msg) => msg,
                        other => other.to_string(),
                    };
                    report.integrity_errors.push(IntegrityIssue {
                        vehicle_id: baseline.vehicle_id.clone(),
                        inspection_type_id: baseline.inspection_type_id,
                        message,
                    });
                }
            }
        }

        report.projections.sort_by(compare_projections);
        report
    }

    /// Load baselines in `scope` from the store, project them and apply
    /// `filter`.
    pub async fn load_schedule<S: BaselineStore>(
        &self,
        store: &S,
        scope: &BaselineScope,
        inspection_types: &[InspectionType],
        as_of: NaiveDate,
        filter: &ScheduleFilter,
    ) -> Result<ProjectionReport, CoreError> {
        filter.validate()?;
        let baselines = store.list(scope).await?;
        let mut report = self.project_all(&baselines, inspection_types, as_of);
        report.retain(filter);
        Ok(report)
    }
}

fn unusable_type(inspection_type: &InspectionType, err: CoreError) -> CoreError {
    let detail = match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    };
    CoreError::DataIntegrity(format!(
        "inspection type {} cannot be projected: {detail}",
        inspection_type.id
    ))
}

fn compare_projections(a: &ScheduleProjection, b: &ScheduleProjection) -> Ordering {
    a.days_until
        .cmp(&b.days_until)
        .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
        .then_with(|| a.inspection_type_id.cmp(&b.inspection_type_id))
}

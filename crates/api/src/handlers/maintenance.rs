//! Handlers for baseline resolution and schedule projection.
//!
//! Routes nested under `/maintenance`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use railfleet_core::baseline::BaselineCandidate;
use railfleet_core::error::CoreError;
use railfleet_core::inspection::InspectionType;
use railfleet_core::resolver::{ItemResult, SkipReason};
use railfleet_core::schedule::{
    IntegrityIssue, ProjectionReport, ScheduleFilter, ScheduleProjection, ScheduleSummary,
};
use railfleet_core::store::BaselineScope;
use railfleet_core::types::DbId;
use railfleet_db::repositories::InspectionTypeRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::{AsOfParams, ScheduleParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest batch accepted in one request.
pub const MAX_BATCH_SIZE: usize = 1_000;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /maintenance/baselines/batch`.
///
/// Candidates stay raw JSON so one wrongly typed entry is skipped on its own.
#[derive(Debug, Deserialize)]
pub struct BaselineBatchRequest {
    pub candidates: Vec<serde_json::Value>,
}

/// Body of `POST /maintenance/vehicles/{vehicle_id}/completions`.
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub inspection_type_id: DbId,
    /// Defaults to today (UTC).
    pub completed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub as_of: NaiveDate,
    pub summary: ScheduleSummary,
    pub projections: Vec<ScheduleProjection>,
    pub integrity_errors: Vec<IntegrityIssue>,
}

impl ScheduleResponse {
    fn new(as_of: NaiveDate, report: ProjectionReport) -> Self {
        Self {
            as_of,
            summary: report.summary(),
            projections: report.projections,
            integrity_errors: report.integrity_errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/maintenance/baselines/batch
///
/// Resolve a batch of baseline candidates. Invalid entries are reported per
/// item; a store failure aborts the request with 503.
pub async fn apply_batch(
    State(state): State<AppState>,
    Json(body): Json<BaselineBatchRequest>,
) -> AppResult<impl IntoResponse> {
    if body.candidates.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "Batch of {} candidates exceeds the maximum of {MAX_BATCH_SIZE}",
            body.candidates.len()
        )));
    }

    let candidates: Vec<BaselineCandidate> = body
        .candidates
        .into_iter()
        .map(BaselineCandidate::from_json)
        .collect();

    let outcome = state.resolver.apply_batch(&candidates).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/maintenance/schedule
///
/// Fleet-wide schedule, optionally scoped to an office or vehicle and
/// filtered by due window.
pub async fn list_schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> AppResult<impl IntoResponse> {
    let as_of = params.as_of.unwrap_or_else(today);
    let report = load(&state, &params.scope(), as_of, &params.filter()).await?;
    Ok(Json(DataResponse {
        data: ScheduleResponse::new(as_of, report),
    }))
}

/// GET /api/v1/maintenance/vehicles/{vehicle_id}/schedule
///
/// All projections for one vehicle. An unknown vehicle yields an empty list.
pub async fn vehicle_schedule(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Query(params): Query<AsOfParams>,
) -> AppResult<impl IntoResponse> {
    let as_of = params.as_of.unwrap_or_else(today);
    let scope = BaselineScope::vehicle(vehicle_id);
    let report = load(&state, &scope, as_of, &ScheduleFilter::default()).await?;
    Ok(Json(DataResponse {
        data: ScheduleResponse::new(as_of, report),
    }))
}

/// POST /api/v1/maintenance/vehicles/{vehicle_id}/completions
///
/// Record a completed inspection as the vehicle's new baseline. Answers 201
/// when written and 200 with the skip reason when a more trusted baseline
/// is kept.
pub async fn record_completion(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Json(body): Json<CompletionRequest>,
) -> AppResult<impl IntoResponse> {
    InspectionTypeRepo::find_by_id(&state.pool, body.inspection_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "InspectionType",
            id: body.inspection_type_id,
        }))?;

    let completed_on = body.completed_on.unwrap_or_else(today);
    let outcome = state
        .resolver
        .record_completion(&vehicle_id, body.inspection_type_id, completed_on, body.notes)
        .await?;

    let status = match &outcome.result {
        ItemResult::Applied => StatusCode::CREATED,
        ItemResult::Skipped(SkipReason::InvalidInput { message }) => {
            return Err(AppError::Core(CoreError::Validation(message.clone())));
        }
        ItemResult::Skipped(SkipReason::LowerPriority { .. }) => StatusCode::OK,
    };
    Ok((status, Json(DataResponse { data: outcome })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn load(
    state: &AppState,
    scope: &BaselineScope,
    as_of: NaiveDate,
    filter: &ScheduleFilter,
) -> AppResult<ProjectionReport> {
    let inspection_types: Vec<InspectionType> = InspectionTypeRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(InspectionType::from)
        .collect();

    let report = state
        .projector
        .load_schedule(
            state.resolver.store().as_ref(),
            scope,
            &inspection_types,
            as_of,
            filter,
        )
        .await?;
    Ok(report)
}

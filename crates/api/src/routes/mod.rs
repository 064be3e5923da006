pub mod health;
pub mod maintenance;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /maintenance/baselines/batch                      apply baseline batch (POST)
/// /maintenance/schedule                             fleet schedule
/// /maintenance/vehicles/{vehicle_id}/schedule       one vehicle's schedule
/// /maintenance/vehicles/{vehicle_id}/completions    record completion (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/maintenance", maintenance::router())
}

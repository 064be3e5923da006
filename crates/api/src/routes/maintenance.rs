//! Route definitions for maintenance scheduling.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::maintenance;
use crate::state::AppState;

/// Routes mounted at `/maintenance`.
///
/// ```text
/// POST   /baselines/batch                   -> apply_batch
/// GET    /schedule                          -> list_schedule
/// GET    /vehicles/{vehicle_id}/schedule    -> vehicle_schedule
/// POST   /vehicles/{vehicle_id}/completions -> record_completion
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/baselines/batch", post(maintenance::apply_batch))
        .route("/schedule", get(maintenance::list_schedule))
        .route(
            "/vehicles/{vehicle_id}/schedule",
            get(maintenance::vehicle_schedule),
        )
        .route(
            "/vehicles/{vehicle_id}/completions",
            post(maintenance::record_completion),
        )
}

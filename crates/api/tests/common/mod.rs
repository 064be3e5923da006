use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use railfleet_api::config::ServerConfig;
use railfleet_api::router::build_app_router;
use railfleet_api::state::AppState;
use railfleet_core::config::ScheduleConfig;
use railfleet_core::resolver::ConflictPolicy;
use railfleet_core::schedule::WarningThreshold;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Warning threshold is a fixed 14 days and conflicts overwrite.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        schedule: ScheduleConfig {
            warning_threshold: WarningThreshold::Fixed(14),
            conflict_policy: ConflictPolicy::Overwrite,
            store_timeout: Duration::from_secs(10),
        },
    }
}

/// Build the full application router, exactly as `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with(pool, test_config())
}

/// Build the application with a caller-supplied configuration.
pub fn build_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert an inspection type and return its id.
#[allow(dead_code)]
pub async fn seed_inspection_type(
    pool: &PgPool,
    name: &str,
    cycle_months: i32,
    duration_days: i32,
) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO inspection_types (name, category, cycle_months, duration_days) \
         VALUES ($1, 'periodic', $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(cycle_months)
    .bind(duration_days)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

/// Insert an office and return its id.
#[allow(dead_code)]
pub async fn seed_office(pool: &PgPool, name: &str) -> i64 {
    let row: (i64,) = sqlx::query_as("INSERT INTO offices (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

/// Insert a vehicle assigned to `office_id`.
#[allow(dead_code)]
pub async fn seed_vehicle(pool: &PgPool, id: &str, office_id: Option<i64>) {
    sqlx::query("INSERT INTO vehicles (id, name, office_id) VALUES ($1, $1, $2)")
        .bind(id)
        .bind(office_id)
        .execute(pool)
        .await
        .unwrap();
}

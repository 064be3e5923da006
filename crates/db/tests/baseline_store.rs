//! Integration tests for baseline persistence.
//!
//! Exercises the repository layer and `PgBaselineStore` against a real
//! database:
//! - Upsert inserts once and updates in place
//! - Office and vehicle scoping of listings
//! - Resolver batches through the Postgres store
//! - Concurrent upserts on one key

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use railfleet_core::baseline::{BaselineCandidate, BaselineSource, BaselineUpsert};
use railfleet_core::inspection::InspectionType;
use railfleet_core::resolver::{BaselineResolver, ConflictPolicy};
use railfleet_core::store::{BaselineScope, BaselineStore};
use railfleet_db::repositories::{BaselineRepo, InspectionTypeRepo};
use railfleet_db::store::PgBaselineStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn upsert(vehicle: &str, type_id: i64, base: &str, source: BaselineSource) -> BaselineUpsert {
    BaselineUpsert {
        vehicle_id: vehicle.to_string(),
        inspection_type_id: type_id,
        base_date: date(base),
        source,
        notes: String::new(),
    }
}

async fn seed_office(pool: &PgPool, name: &str) -> i64 {
    let row: (i64,) = sqlx::query_as("INSERT INTO offices (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

async fn seed_vehicle(pool: &PgPool, id: &str, office_id: Option<i64>) {
    sqlx::query("INSERT INTO vehicles (id, name, office_id) VALUES ($1, $1, $2)")
        .bind(id)
        .bind(office_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_inspection_type(
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

// ---------------------------------------------------------------------------
// Test: upsert inserts then updates the same row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_updates_in_place(pool: PgPool) {
    let store = PgBaselineStore::new(pool.clone());

    assert!(store.get("V1", 1).await.unwrap().is_none());

    let first = store
        .upsert(&upsert("V1", 1, "2024-01-01", BaselineSource::Purchase))
        .await
        .unwrap();
    let mut second_input = upsert("V1", 1, "2024-04-01", BaselineSource::Completion);
    second_input.notes = "bogie inspection".to_string();
    let second = store.upsert(&second_input).await.unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.base_date, date("2024-04-01"));
    assert_eq!(second.source, BaselineSource::Completion);
    assert_eq!(second.notes, "bogie inspection");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM maintenance_baselines")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    let row = BaselineRepo::find(&pool, "V1", 1).await.unwrap().unwrap();
    assert_eq!(row.source, "completion");
}

// ---------------------------------------------------------------------------
// Test: listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_vehicle_orders_by_type(pool: PgPool) {
    let store = PgBaselineStore::new(pool);
    for type_id in [5, 2, 9] {
        store
            .upsert(&upsert("V1", type_id, "2024-01-01", BaselineSource::Manual))
            .await
            .unwrap();
    }
    store
        .upsert(&upsert("V2", 1, "2024-01-01", BaselineSource::Manual))
        .await
        .unwrap();

    let ids: Vec<i64> = store
        .list_for_vehicle("V1")
        .await
        .unwrap()
        .iter()
        .map(|r| r.inspection_type_id)
        .collect();
    assert_eq!(ids, vec![2, 5, 9]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_scoped_by_office_and_vehicle(pool: PgPool) {
    let north = seed_office(&pool, "North depot").await;
    let south = seed_office(&pool, "South depot").await;
    seed_vehicle(&pool, "MTT-01", Some(north)).await;
    seed_vehicle(&pool, "MTT-02", Some(north)).await;
    seed_vehicle(&pool, "MTT-03", Some(south)).await;

    let store = PgBaselineStore::new(pool);
    for vehicle in ["MTT-01", "MTT-02", "MTT-03", "MTT-99"] {
        store
            .upsert(&upsert(vehicle, 1, "2024-01-01", BaselineSource::Manual))
            .await
            .unwrap();
    }

    let all = store.list(&BaselineScope::default()).await.unwrap();
    assert_eq!(all.len(), 4);

    let north_only = store
        .list(&BaselineScope {
            office_id: Some(north),
            vehicle_ids: None,
        })
        .await
        .unwrap();
    let vehicles: Vec<&str> = north_only.iter().map(|r| r.vehicle_id.as_str()).collect();
    assert_eq!(vehicles, vec!["MTT-01", "MTT-02"]);

    let narrowed = store
        .list(&BaselineScope {
            office_id: Some(north),
            vehicle_ids: Some(vec!["MTT-02".to_string(), "MTT-03".to_string()]),
        })
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].vehicle_id, "MTT-02");
}

// ---------------------------------------------------------------------------
// Test: catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspection_type_catalog(pool: PgPool) {
    let id = seed_inspection_type(&pool, "Brake check", 3, 2).await;

    let listed: Vec<InspectionType> = InspectionTypeRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(InspectionType::from)
        .collect();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].cycle_months, 3);

    assert!(InspectionTypeRepo::find_by_id(&pool, id).await.unwrap().is_some());
    assert!(InspectionTypeRepo::find_by_id(&pool, id + 1000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_cycle_rejected_by_schema(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO inspection_types (name, category, cycle_months) VALUES ('Broken', 'x', 0)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Test: resolver through Postgres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolver_batch_against_postgres(pool: PgPool) {
    let store = Arc::new(PgBaselineStore::new(pool));
    let resolver = BaselineResolver::new(
        Arc::clone(&store),
        ConflictPolicy::SourcePriority,
        Duration::from_secs(10),
    );

    let batch: Vec<BaselineCandidate> = vec![
        serde_json::json!({"vehicle_id": "V1", "inspection_type_id": 7, "base_date": "2024-06-01", "source": "manual"}),
        serde_json::json!({"vehicle_id": "V1", "inspection_type_id": 7, "base_date": "2024-07-01", "source": "system"}),
        serde_json::json!({"vehicle_id": "V2", "inspection_type_id": 7}),
    ]
    .into_iter()
    .map(BaselineCandidate::from_json)
    .collect();

    let outcome = resolver.apply_batch(&batch).await.unwrap();
    assert_eq!(outcome.applied_count, 1);
    assert_eq!(outcome.skipped_count, 2);

    let stored = store.get("V1", 7).await.unwrap().unwrap();
    assert_eq!(stored.base_date, date("2024-06-01"));
    assert_eq!(stored.source, BaselineSource::Manual);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_upserts_keep_single_row(pool: PgPool) {
    let store = PgBaselineStore::new(pool.clone());
    let mut handles = Vec::new();
    for day in 1..=10u32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut input = upsert("V1", 1, &format!("2024-05-{day:02}"), BaselineSource::Manual);
            input.notes = format!("day {day:02}");
            store.upsert(&input).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let rows = BaselineRepo::list_for_vehicle(&pool, "V1").await.unwrap();
    assert_eq!(rows.len(), 1);
    // Date and notes come from the same statement.
    assert_eq!(rows[0].notes, format!("day {}", rows[0].base_date.format("%d")));
}

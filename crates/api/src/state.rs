use std::sync::Arc;

use railfleet_core::resolver::BaselineResolver;
use railfleet_core::schedule::ScheduleProjector;
use railfleet_db::store::PgBaselineStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: railfleet_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Baseline resolver over the Postgres store.
    pub resolver: BaselineResolver<PgBaselineStore>,
    /// Schedule projector with the configured warning threshold.
    pub projector: ScheduleProjector,
}

impl AppState {
    /// Wire the engine components from a pool and loaded configuration.
    pub fn new(pool: railfleet_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgBaselineStore::new(pool.clone()));
        let resolver = BaselineResolver::new(
            store,
            config.schedule.conflict_policy,
            config.schedule.store_timeout,
        );
        let projector = ScheduleProjector::new(config.schedule.warning_threshold);
        Self {
            pool,
            config: Arc::new(config),
            resolver,
            projector,
        }
    }
}

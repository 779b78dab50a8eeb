//! Storage layer for the bandit allocation service.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod allocation_repository;
pub mod error;
pub mod experiment_repository;
pub mod metrics_repository;

pub use allocation_repository::{
    AllocationDetailRow, AllocationHistoryRepository, AllocationRecordRow, NewAllocationDetail,
    NewAllocationRecord,
};
pub use error::StorageError;
pub use experiment_repository::{
    ExperimentRepository, ExperimentRow, ExperimentWithVariants, NewVariant, VariantRow,
};
pub use metrics_repository::{AllocationInputRow, MetricEntry, MetricsRepository};

/// Create the PostgreSQL connection pool.
///
/// `max_connections` bounds warehouse load; it comes from
/// `DATABASE_MAX_CONNECTIONS` and is validated to be nonzero at config
/// load.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(StorageError::Connection)
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)
}

/// Round-trip a trivial query; used by the readiness probe.
pub async fn check_connection(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StorageError::Query)
        .map(|_| ())
}

//! Request handlers.

pub mod allocation;
pub mod experiments;
pub mod metrics;

use bandit_domain::DomainError;
use bandit_storage::StorageError;

/// Translate storage failures into domain errors.
pub(crate) fn map_storage_err(err: StorageError) -> DomainError {
    match err {
        StorageError::NotFound(what) => DomainError::NotFound(what),
        StorageError::UnknownVariant(name) => DomainError::UnknownVariant(name),
        err @ StorageError::NameConflict(_) => DomainError::Conflict(err.to_string()),
        other => {
            tracing::error!("Storage error: {other}");
            DomainError::Database(other.to_string())
        }
    }
}

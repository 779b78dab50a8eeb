//! Experiment handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use bandit_domain::{
    DomainError, ExperimentCreate, ExperimentResponse, ExperimentStatus, StatusUpdateRequest,
    VariantResponse,
};
use bandit_storage::{ExperimentWithVariants, NewVariant};

use super::map_storage_err;
use crate::AppState;

fn to_response(record: ExperimentWithVariants) -> ExperimentResponse {
    ExperimentResponse {
        id: record.experiment.id,
        name: record.experiment.name,
        description: record.experiment.description,
        status: record.experiment.status,
        variants: record
            .variants
            .into_iter()
            .map(|v| VariantResponse {
                id: v.id,
                name: v.name,
                is_control: v.is_control,
                created_at: v.created_at,
            })
            .collect(),
        created_at: record.experiment.created_at,
        updated_at: record.experiment.updated_at,
    }
}

/// Create an experiment with its variants.
pub async fn create_experiment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExperimentCreate>,
) -> Result<(StatusCode, Json<ExperimentResponse>), DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;
    req.check_invariants()?;

    tracing::info!(
        name = %req.name,
        variants = req.variants.len(),
        "Creating experiment"
    );

    let variants: Vec<NewVariant> = req
        .variants
        .iter()
        .map(|v| NewVariant {
            name: v.name.clone(),
            is_control: v.is_control,
        })
        .collect();

    let created = state
        .experiments
        .create(&req.name, req.description.as_deref(), &variants)
        .await
        .map_err(map_storage_err)?;

    tracing::info!(experiment_id = %created.experiment.id, "Experiment created");

    Ok((StatusCode::CREATED, Json(to_response(created))))
}

/// Get experiment details including all variants.
pub async fn get_experiment(
    State(state): State<Arc<AppState>>,
    Path(experiment_id): Path<Uuid>,
) -> Result<Json<ExperimentResponse>, DomainError> {
    let record = state
        .experiments
        .get(experiment_id)
        .await
        .map_err(map_storage_err)?
        .ok_or_else(|| DomainError::NotFound("Experiment".to_string()))?;

    Ok(Json(to_response(record)))
}

/// Change an experiment's lifecycle status.
pub async fn update_experiment_status(
    State(state): State<Arc<AppState>>,
    Path(experiment_id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ExperimentResponse>, DomainError> {
    let status: ExperimentStatus = req.status.parse()?;

    let updated = state
        .experiments
        .update_status(experiment_id, status.as_str())
        .await
        .map_err(map_storage_err)?
        .ok_or_else(|| DomainError::NotFound("Experiment".to_string()))?;

    tracing::info!(
        experiment_id = %experiment_id,
        status = status.as_str(),
        "Experiment status updated"
    );

    Ok(Json(to_response(updated)))
}

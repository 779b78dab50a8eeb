//! Allocation and allocation-history handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use bandit_domain::{
    AllocationDetailDto, AllocationHistoryResponse, AllocationRecordDto, AllocationResponse,
    DomainError,
};

use super::map_storage_err;
use crate::AppState;

/// Query parameters for the allocation endpoint.
#[derive(Debug, Deserialize)]
pub struct AllocationQuery {
    pub window_days: Option<i32>,
}

/// Compute the recommended traffic allocation for an experiment.
pub async fn get_allocation(
    State(state): State<Arc<AppState>>,
    Path(experiment_id): Path<Uuid>,
    Query(query): Query<AllocationQuery>,
) -> Result<Json<AllocationResponse>, DomainError> {
    if let Some(window) = query.window_days {
        if !(1..=90).contains(&window) {
            return Err(DomainError::Validation(
                "window_days must be between 1 and 90".to_string(),
            ));
        }
    }

    let response = state
        .allocation
        .compute(experiment_id, query.window_days)
        .await?;

    Ok(Json(response))
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// List prior allocation computations with their per-variant details.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(experiment_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AllocationHistoryResponse>, DomainError> {
    let limit = query.limit.unwrap_or(30);
    if !(1..=100).contains(&limit) {
        return Err(DomainError::Validation(
            "limit must be between 1 and 100".to_string(),
        ));
    }

    let experiment = state
        .experiments
        .get(experiment_id)
        .await
        .map_err(map_storage_err)?
        .ok_or_else(|| DomainError::NotFound("Experiment".to_string()))?;

    let records = state
        .history
        .list(experiment_id, limit)
        .await
        .map_err(map_storage_err)?;

    let history = records
        .into_iter()
        .map(|(record, details)| AllocationRecordDto {
            id: record.id,
            computed_at: record.computed_at,
            window_days: record.window_days,
            algorithm: record.algorithm,
            algorithm_version: record.algorithm_version,
            seed: record.seed,
            used_fallback: record.used_fallback,
            total_impressions: record.total_impressions,
            total_clicks: record.total_clicks,
            allocations: details
                .into_iter()
                .map(|d| AllocationDetailDto {
                    variant_id: d.variant_id,
                    variant_name: d.variant_name,
                    is_control: d.is_control,
                    allocation_percentage: d.allocation_percentage,
                    impressions: d.impressions,
                    clicks: d.clicks,
                    ctr: d.ctr,
                    ctr_ci_lower: d.ctr_ci_lower,
                    ctr_ci_upper: d.ctr_ci_upper,
                    beta_alpha: d.beta_alpha,
                    beta_beta: d.beta_beta,
                })
                .collect(),
        })
        .collect();

    Ok(Json(AllocationHistoryResponse {
        experiment_id,
        experiment_name: experiment.experiment.name,
        history,
    }))
}

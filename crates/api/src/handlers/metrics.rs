//! Metrics ingestion handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use bandit_domain::{DomainError, MetricSource, MetricsBatchRequest, MetricsResponse};
use bandit_storage::MetricEntry;

use super::map_storage_err;
use crate::AppState;

/// Record daily aggregated metrics for an experiment's variants.
///
/// Each entry lands twice: appended to the raw log for audit, upserted
/// into the daily table for clean reads.
pub async fn record_metrics(
    State(state): State<Arc<AppState>>,
    Path(experiment_id): Path<Uuid>,
    Json(req): Json<MetricsBatchRequest>,
) -> Result<(StatusCode, Json<MetricsResponse>), DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;
    req.check_invariants()?;
    let source: MetricSource = req.source.parse()?;

    tracing::info!(
        experiment_id = %experiment_id,
        date = %req.date,
        entries = req.metrics.len(),
        source = source.as_str(),
        "Recording metrics batch"
    );

    let entries: Vec<MetricEntry> = req
        .metrics
        .iter()
        .map(|m| MetricEntry {
            variant_name: m.variant_name.clone(),
            impressions: m.impressions,
            clicks: m.clicks,
            sessions: m.sessions,
            revenue: m.revenue,
        })
        .collect();

    let variants_updated = state
        .metrics
        .record_batch(
            experiment_id,
            req.date,
            &entries,
            source.as_str(),
            req.batch_id.as_deref(),
        )
        .await
        .map_err(map_storage_err)?;

    tracing::info!(
        experiment_id = %experiment_id,
        variants_updated,
        "Metrics recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(MetricsResponse {
            message: "Metrics recorded successfully".to_string(),
            date: req.date,
            variants_updated,
            batch_id: req.batch_id,
        }),
    ))
}

//! Allocation and allocation-history response DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 95% confidence interval bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Windowed metrics reported alongside an allocation.
///
/// `sessions`, `revenue`, and `ctr_ci` depend on what the ingestion
/// sources delivered and are omitted when absent.
#[derive(Debug, Clone, Serialize)]
pub struct VariantMetrics {
    pub impressions: i64,
    pub clicks: i64,
    pub ctr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr_ci: Option<ConfidenceInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Decimal>,
}

/// Recommended traffic share for a single variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantAllocation {
    pub variant_name: String,
    pub is_control: bool,
    pub allocation_percentage: f64,
    pub metrics: VariantMetrics,
}

/// Response for an allocation computation.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub experiment_id: Uuid,
    pub experiment_name: String,
    pub computed_at: DateTime<Utc>,
    pub algorithm: String,
    pub window_days: i32,
    pub allocations: Vec<VariantAllocation>,
}

/// Persisted per-variant detail of a historical allocation.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationDetailDto {
    pub variant_id: Uuid,
    pub variant_name: String,
    pub is_control: bool,
    pub allocation_percentage: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub ctr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr_ci_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr_ci_upper: Option<f64>,
    pub beta_alpha: i64,
    pub beta_beta: i64,
}

/// One historical allocation computation.
#[derive(Debug, Serialize)]
pub struct AllocationRecordDto {
    pub id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub window_days: i32,
    pub algorithm: String,
    pub algorithm_version: String,
    pub seed: i64,
    pub used_fallback: bool,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub allocations: Vec<AllocationDetailDto>,
}

/// Response for the allocation-history endpoint.
#[derive(Debug, Serialize)]
pub struct AllocationHistoryResponse {
    pub experiment_id: Uuid,
    pub experiment_name: String,
    pub history: Vec<AllocationRecordDto>,
}

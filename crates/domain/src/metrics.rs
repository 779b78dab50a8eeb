//! Metrics ingestion DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DomainError;

/// Daily counts for a single variant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MetricInput {
    #[validate(length(min = 1, max = 100))]
    pub variant_name: String,
    #[validate(range(min = 0))]
    pub impressions: i64,
    #[validate(range(min = 0))]
    pub clicks: i64,
    #[validate(range(min = 0))]
    pub sessions: Option<i64>,
    pub revenue: Option<Decimal>,
}

/// Batch of daily metrics for an experiment.
///
/// `source` arrives as a raw string; the handler parses it so an
/// unknown value maps to 422 instead of a body-deserialization 400.
#[derive(Debug, Deserialize, Validate)]
pub struct MetricsBatchRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "at least one metric entry is required"), nested)]
    pub metrics: Vec<MetricInput>,
    #[serde(default = "default_source")]
    pub source: String,
    pub batch_id: Option<String>,
}

fn default_source() -> String {
    "api".to_string()
}

impl MetricsBatchRequest {
    /// Cross-field invariants the derive cannot express.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        for metric in &self.metrics {
            if metric.clicks > metric.impressions {
                return Err(DomainError::Validation(format!(
                    "Clicks ({}) cannot exceed impressions ({}) for variant '{}'",
                    metric.clicks, metric.impressions, metric.variant_name
                )));
            }
            if metric.revenue.is_some_and(|r| r.is_sign_negative()) {
                return Err(DomainError::Validation(format!(
                    "Revenue cannot be negative for variant '{}'",
                    metric.variant_name
                )));
            }
        }
        Ok(())
    }
}

/// Response for a recorded metrics batch.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub message: String,
    pub date: NaiveDate,
    pub variants_updated: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

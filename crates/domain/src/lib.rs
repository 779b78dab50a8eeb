//! Domain types for the bandit allocation service.

pub mod allocation;
pub mod errors;
pub mod experiments;
pub mod metrics;

use serde::Serialize;
use std::str::FromStr;

pub use allocation::*;
pub use errors::*;
pub use experiments::*;
pub use metrics::*;

/// Experiment lifecycle status.
///
/// Request DTOs carry the raw string and parse it explicitly, so an
/// unknown value surfaces as a validation error rather than a
/// deserialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentStatus {
    Active,
    Paused,
    Archived,
}

impl ExperimentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentStatus::Active => "active",
            ExperimentStatus::Paused => "paused",
            ExperimentStatus::Archived => "archived",
        }
    }
}

impl FromStr for ExperimentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(ExperimentStatus::Active),
            "paused" => Ok(ExperimentStatus::Paused),
            "archived" => Ok(ExperimentStatus::Archived),
            other => Err(DomainError::Validation(format!(
                "Unknown status '{other}', expected one of: active, paused, archived"
            ))),
        }
    }
}

/// Origin of an ingested metrics batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    Api,
    Gam,
    Cdp,
    Manual,
}

impl MetricSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSource::Api => "api",
            MetricSource::Gam => "gam",
            MetricSource::Cdp => "cdp",
            MetricSource::Manual => "manual",
        }
    }
}

impl FromStr for MetricSource {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "api" => Ok(MetricSource::Api),
            "gam" => Ok(MetricSource::Gam),
            "cdp" => Ok(MetricSource::Cdp),
            "manual" => Ok(MetricSource::Manual),
            other => Err(DomainError::Validation(format!(
                "Unknown source '{other}', expected one of: api, gam, cdp, manual"
            ))),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Ready check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
}

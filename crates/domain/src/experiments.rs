//! Experiment request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::DomainError;

/// Request body for creating a variant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VariantCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub is_control: bool,
}

/// Request body for creating an experiment.
#[derive(Debug, Deserialize, Validate)]
pub struct ExperimentCreate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 2, message = "at least 2 variants are required"), nested)]
    pub variants: Vec<VariantCreate>,
}

impl ExperimentCreate {
    /// Cross-field invariants: at least one control, unique variant names.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        if !self.variants.iter().any(|v| v.is_control) {
            return Err(DomainError::Validation(
                "At least one variant must be marked as control (is_control=true)".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(DomainError::Validation(
                    "Variant names must be unique within an experiment".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Request body for changing an experiment's status.
///
/// The status arrives as a raw string; the handler parses it so an
/// unknown value maps to 422 instead of a body-deserialization 400.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Variant response DTO.
#[derive(Debug, Clone, Serialize)]
pub struct VariantResponse {
    pub id: Uuid,
    pub name: String,
    pub is_control: bool,
    pub created_at: DateTime<Utc>,
}

/// Experiment response DTO.
#[derive(Debug, Serialize)]
pub struct ExperimentResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub variants: Vec<VariantResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

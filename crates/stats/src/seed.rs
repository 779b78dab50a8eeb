//! Deterministic seed derivation.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive the sampler seed from an experiment and a calendar date.
///
/// Same experiment and date give the same seed, so repeated allocation
/// calls within a UTC day reproduce the same split; a new day
/// re-randomizes. The seed is the low 32 bits of
/// `SHA-256("{experiment_id}_{date}")`.
pub fn allocation_seed(experiment_id: Uuid, date: NaiveDate) -> u32 {
    let input = format!("{experiment_id}_{date}");
    let digest = Sha256::digest(input.as_bytes());
    u32::from_be_bytes([digest[28], digest[29], digest[30], digest[31]])
}

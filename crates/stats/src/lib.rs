//! Statistics kernel for the bandit allocation service.
//!
//! Pure and seedable: posterior construction, Wilson score intervals,
//! deterministic seed derivation, and the Monte Carlo Thompson sampler.
//! No I/O happens here; every function is total for zero counts.

pub mod seed;
pub mod thompson;
pub mod wilson;

pub use seed::allocation_seed;
pub use thompson::{ALGORITHM_NAME, ALGORITHM_VERSION, Arm, BetaParams, ThompsonSampler, posterior};
pub use wilson::{WilsonInterval, wilson_score_interval};

/// True when every variant has reached the impression threshold.
///
/// An empty set is never sufficient: an allocation over no arms has no
/// data to exploit.
pub fn all_sufficient(impressions: &[i64], min_impressions: i64) -> bool {
    !impressions.is_empty() && impressions.iter().all(|&n| n >= min_impressions)
}

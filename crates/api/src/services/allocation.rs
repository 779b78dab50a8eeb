//! Allocation orchestrator.
//!
//! Converts an allocation request into a validated, reproducible
//! result: aggregate the window, widen it when data is thin, fall back
//! to the prior when it stays thin, sample, persist history.

use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use bandit_config::AppConfig;
use bandit_domain::{
    AllocationResponse, ConfidenceInterval, DomainError, VariantAllocation, VariantMetrics,
};
use bandit_stats::{
    ALGORITHM_NAME, ALGORITHM_VERSION, Arm, BetaParams, ThompsonSampler, all_sufficient,
    allocation_seed, posterior, wilson_score_interval,
};
use bandit_storage::{
    AllocationHistoryRepository, AllocationInputRow, ExperimentRepository, MetricsRepository,
    NewAllocationDetail, NewAllocationRecord,
};

use crate::handlers::map_storage_err;

/// Stateful allocation policy over the storage layer and the
/// statistics kernel.
pub struct AllocationService {
    experiments: ExperimentRepository,
    metrics: MetricsRepository,
    history: AllocationHistoryRepository,
    sampler: ThompsonSampler,
    prior_alpha: i64,
    prior_beta: i64,
    min_impressions: i64,
    default_window: i32,
    max_window: i32,
}

impl AllocationService {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            experiments: ExperimentRepository::new(pool.clone()),
            metrics: MetricsRepository::new(pool.clone()),
            history: AllocationHistoryRepository::new(pool),
            sampler: ThompsonSampler::new(config.thompson_samples),
            prior_alpha: config.prior_alpha,
            prior_beta: config.prior_beta,
            min_impressions: config.min_impressions,
            default_window: config.default_window_days,
            max_window: config.max_window_days,
        }
    }

    /// Compute the traffic allocation for an experiment.
    ///
    /// The seed is derived from (experiment, UTC date), so repeated
    /// calls within a day reproduce the same percentages for unchanged
    /// data. History persistence failures are logged and swallowed.
    pub async fn compute(
        &self,
        experiment_id: Uuid,
        window_days: Option<i32>,
    ) -> Result<AllocationResponse, DomainError> {
        let started = Instant::now();
        let computed_at = Utc::now();
        let requested_window = window_days.unwrap_or(self.default_window);

        let experiment = self
            .experiments
            .get(experiment_id)
            .await
            .map_err(map_storage_err)?
            .ok_or_else(|| DomainError::NotFound("Experiment".to_string()))?;

        let mut rows = self
            .metrics
            .aggregate_for_allocation(experiment_id, requested_window)
            .await
            .map_err(map_storage_err)?;
        let mut actual_window = requested_window;

        // Thin data: widen once to the maximum window before giving up
        // on the observed counts.
        if !self.sufficient(&rows) && requested_window < self.max_window {
            actual_window = self.max_window;
            rows = self
                .metrics
                .aggregate_for_allocation(experiment_id, self.max_window)
                .await
                .map_err(map_storage_err)?;
        }

        let used_fallback = !self.sufficient(&rows);

        let arms: Vec<Arm> = rows
            .iter()
            .map(|row| Arm {
                name: row.variant_name.clone(),
                impressions: row.impressions,
                params: if used_fallback {
                    BetaParams {
                        alpha: self.prior_alpha,
                        beta: self.prior_beta,
                    }
                } else {
                    posterior(self.prior_alpha, self.prior_beta, row.impressions, row.clicks)
                },
            })
            .collect();

        let seed = allocation_seed(experiment_id, computed_at.date_naive());
        let allocations = self.sampler.allocate(&arms, seed);

        let mut entries: Vec<VariantAllocation> = rows
            .iter()
            .map(|row| {
                let ctr_ci = wilson_score_interval(row.clicks, row.impressions).map(|ci| {
                    ConfidenceInterval {
                        lower: ci.lower,
                        upper: ci.upper,
                    }
                });
                VariantAllocation {
                    variant_name: row.variant_name.clone(),
                    is_control: row.is_control,
                    allocation_percentage: allocations
                        .get(&row.variant_name)
                        .copied()
                        .unwrap_or(0.0),
                    metrics: VariantMetrics {
                        impressions: row.impressions,
                        clicks: row.clicks,
                        ctr: round6(row.ctr),
                        ctr_ci,
                        sessions: (row.sessions > 0).then_some(row.sessions),
                        revenue: (!row.revenue.is_zero()).then_some(row.revenue),
                    },
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.is_control
                .cmp(&a.is_control)
                .then(b.allocation_percentage.total_cmp(&a.allocation_percentage))
        });

        let algorithm = if used_fallback {
            format!("{ALGORITHM_NAME} (fallback: prior only)")
        } else {
            ALGORITHM_NAME.to_string()
        };

        self.save_history(
            experiment_id,
            computed_at,
            actual_window,
            seed,
            used_fallback,
            &rows,
            &arms,
            &allocations,
        )
        .await;

        let total_impressions: i64 = rows.iter().map(|r| r.impressions).sum();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            algorithm = ALGORITHM_NAME,
            algorithm_version = ALGORITHM_VERSION,
            experiment_id = %experiment_id,
            duration_ms,
            n_samples = self.sampler.n_samples(),
            num_variants = rows.len(),
            total_impressions,
            window_days = actual_window,
            used_fallback,
            seed,
            "Allocation computed"
        );

        Ok(AllocationResponse {
            experiment_id,
            experiment_name: experiment.experiment.name,
            computed_at,
            algorithm,
            window_days: actual_window,
            allocations: entries,
        })
    }

    fn sufficient(&self, rows: &[AllocationInputRow]) -> bool {
        let impressions: Vec<i64> = rows.iter().map(|r| r.impressions).collect();
        all_sufficient(&impressions, self.min_impressions)
    }

    /// Persist the computation. A transient warehouse write error must
    /// never deny callers an allocation, so failures only log.
    #[allow(clippy::too_many_arguments)]
    async fn save_history(
        &self,
        experiment_id: Uuid,
        computed_at: chrono::DateTime<Utc>,
        window_days: i32,
        seed: u32,
        used_fallback: bool,
        rows: &[AllocationInputRow],
        arms: &[Arm],
        allocations: &std::collections::HashMap<String, f64>,
    ) {
        let record = NewAllocationRecord {
            experiment_id,
            computed_at,
            window_days,
            algorithm: ALGORITHM_NAME.to_string(),
            algorithm_version: ALGORITHM_VERSION.to_string(),
            seed: i64::from(seed),
            used_fallback,
        };

        let details: Vec<NewAllocationDetail> = rows
            .iter()
            .zip(arms)
            .map(|(row, arm)| {
                let ci = wilson_score_interval(row.clicks, row.impressions);
                NewAllocationDetail {
                    variant_id: row.variant_id,
                    variant_name: row.variant_name.clone(),
                    is_control: row.is_control,
                    allocation_percentage: allocations
                        .get(&row.variant_name)
                        .copied()
                        .unwrap_or(0.0),
                    impressions: row.impressions,
                    clicks: row.clicks,
                    ctr: round6(row.ctr),
                    ctr_ci_lower: ci.map(|c| c.lower),
                    ctr_ci_upper: ci.map(|c| c.upper),
                    beta_alpha: arm.params.alpha,
                    beta_beta: arm.params.beta,
                }
            })
            .collect();

        if let Err(err) = self.history.save(&record, &details).await {
            tracing::error!(
                experiment_id = %experiment_id,
                "Failed to save allocation history: {err}"
            );
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

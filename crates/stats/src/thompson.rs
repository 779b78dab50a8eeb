//! Monte Carlo Thompson sampling over Beta posteriors.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution};

pub const ALGORITHM_NAME: &str = "thompson_sampling";

/// Bump when priors, sample count semantics, or the win-counting rule change.
pub const ALGORITHM_VERSION: &str = "1.0.0";

/// Beta distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetaParams {
    pub alpha: i64,
    pub beta: i64,
}

impl BetaParams {
    pub fn mean(&self) -> f64 {
        self.alpha as f64 / (self.alpha + self.beta) as f64
    }
}

/// Beta-Bernoulli posterior: alpha = prior_alpha + clicks,
/// beta = prior_beta + impressions - clicks. Strictly positive for any
/// 0 <= clicks <= impressions as long as the priors are >= 1.
pub fn posterior(prior_alpha: i64, prior_beta: i64, impressions: i64, clicks: i64) -> BetaParams {
    BetaParams {
        alpha: prior_alpha + clicks,
        beta: prior_beta + impressions - clicks,
    }
}

/// One bandit arm: observed impressions plus posterior parameters.
#[derive(Debug, Clone)]
pub struct Arm {
    pub name: String,
    pub impressions: i64,
    pub params: BetaParams,
}

/// Monte Carlo Thompson sampler.
///
/// For each of `n_samples` simulations, every arm draws one hypothetical
/// CTR from its posterior; the arm with the highest draw wins. The win
/// share, rounded to two decimals, is that arm's allocation percentage.
#[derive(Debug, Clone)]
pub struct ThompsonSampler {
    n_samples: u32,
}

impl ThompsonSampler {
    pub fn new(n_samples: u32) -> Self {
        Self { n_samples }
    }

    pub fn n_samples(&self) -> u32 {
        self.n_samples
    }

    /// Compute the allocation percentage per arm name.
    ///
    /// Percentages sum to exactly 100.00: they are computed in integer
    /// hundredths and the rounding residue is absorbed by the largest
    /// bucket. Ties on the per-sample argmax and on the largest bucket go
    /// to the earliest arm in the input.
    pub fn allocate(&self, arms: &[Arm], seed: u32) -> HashMap<String, f64> {
        if arms.is_empty() {
            return HashMap::new();
        }

        let total_impressions: i64 = arms.iter().map(|a| a.impressions).sum();
        let hundredths = if total_impressions == 0 {
            uniform_hundredths(arms.len())
        } else {
            self.sampled_hundredths(arms, seed)
        };

        arms.iter()
            .zip(hundredths)
            .map(|(arm, h)| (arm.name.clone(), h as f64 / 100.0))
            .collect()
    }

    fn sampled_hundredths(&self, arms: &[Arm], seed: u32) -> Vec<i64> {
        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        let count = self.n_samples as usize;

        // Arm-major draw order; reordering would change the result for a
        // fixed seed.
        let samples: Vec<Vec<f64>> = arms
            .iter()
            .map(|arm| draw_samples(&mut rng, arm.params, count))
            .collect();

        let mut wins = vec![0u64; arms.len()];
        for i in 0..count {
            let mut best = 0;
            for (j, arm_samples) in samples.iter().enumerate().skip(1) {
                if arm_samples[i] > samples[best][i] {
                    best = j;
                }
            }
            wins[best] += 1;
        }

        let mut hundredths: Vec<i64> = wins
            .iter()
            .map(|&w| (w as f64 * 10_000.0 / f64::from(self.n_samples)).round() as i64)
            .collect();
        absorb_residue(&mut hundredths);
        hundredths
    }
}

fn uniform_hundredths(n: usize) -> Vec<i64> {
    let share = (10_000.0 / n as f64).round() as i64;
    let mut hundredths = vec![share; n];
    absorb_residue(&mut hundredths);
    hundredths
}

/// Adjust the largest bucket so the buckets sum to exactly 100.00.
fn absorb_residue(hundredths: &mut [i64]) {
    let residue: i64 = 10_000 - hundredths.iter().sum::<i64>();
    if residue == 0 {
        return;
    }
    let mut largest = 0;
    for (i, &h) in hundredths.iter().enumerate() {
        if h > hundredths[largest] {
            largest = i;
        }
    }
    hundredths[largest] += residue;
}

fn draw_samples(rng: &mut StdRng, params: BetaParams, count: usize) -> Vec<f64> {
    match Beta::new(params.alpha as f64, params.beta as f64) {
        Ok(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
        // Unreachable for posteriors built from valid priors; keeps the
        // sampler total.
        Err(_) => vec![params.mean(); count],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIOR_ALPHA: i64 = 1;
    const PRIOR_BETA: i64 = 99;

    fn arm(name: &str, impressions: i64, clicks: i64) -> Arm {
        Arm {
            name: name.to_string(),
            impressions,
            params: posterior(PRIOR_ALPHA, PRIOR_BETA, impressions, clicks),
        }
    }

    fn total(allocations: &HashMap<String, f64>) -> f64 {
        allocations.values().sum()
    }

    #[test]
    fn posterior_adds_counts_to_the_prior() {
        let params = posterior(PRIOR_ALPHA, PRIOR_BETA, 10_000, 100);
        assert_eq!(params.alpha, 101);
        assert_eq!(params.beta, 9_999);
    }

    #[test]
    fn posterior_with_all_clicks_keeps_prior_beta() {
        let params = posterior(PRIOR_ALPHA, PRIOR_BETA, 500, 500);
        assert_eq!(params.alpha, 501);
        assert_eq!(params.beta, PRIOR_BETA);
    }

    #[test]
    fn clear_winner_dominates() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![arm("control", 10_000, 100), arm("variant_a", 10_000, 500)];

        let allocations = sampler.allocate(&arms, 42);

        assert!(allocations["variant_a"] > 90.0);
        assert!(allocations["control"] < 10.0);
        assert!((total(&allocations) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn equal_performers_split_roughly_evenly() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![arm("control", 10_000, 300), arm("variant_a", 10_000, 300)];

        let allocations = sampler.allocate(&arms, 42);

        assert!(allocations["control"] > 40.0 && allocations["control"] < 60.0);
        assert!(allocations["variant_a"] > 40.0 && allocations["variant_a"] < 60.0);
        assert!((total(&allocations) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ordering_follows_observed_ctr() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![
            arm("control", 10_000, 200),
            arm("variant_a", 10_000, 400),
            arm("variant_b", 10_000, 300),
        ];

        let allocations = sampler.allocate(&arms, 7);

        assert!(allocations["variant_a"] > allocations["variant_b"]);
        assert!(allocations["variant_b"] > allocations["control"]);
    }

    #[test]
    fn no_data_gives_uniform_split() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![arm("control", 0, 0), arm("variant_a", 0, 0)];

        let allocations = sampler.allocate(&arms, 42);

        assert_eq!(allocations["control"], 50.0);
        assert_eq!(allocations["variant_a"], 50.0);
    }

    #[test]
    fn uniform_residue_lands_on_the_first_arm() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![arm("a", 0, 0), arm("b", 0, 0), arm("c", 0, 0)];

        let allocations = sampler.allocate(&arms, 42);

        assert_eq!(allocations["a"], 33.34);
        assert_eq!(allocations["b"], 33.33);
        assert_eq!(allocations["c"], 33.33);
    }

    #[test]
    fn empty_arms_give_empty_allocation() {
        let sampler = ThompsonSampler::new(10_000);
        assert!(sampler.allocate(&[], 42).is_empty());
    }

    #[test]
    fn single_arm_takes_everything() {
        let sampler = ThompsonSampler::new(10_000);
        let allocations = sampler.allocate(&[arm("only", 1_000, 30)], 42);
        assert_eq!(allocations["only"], 100.0);
    }

    #[test]
    fn same_seed_reproduces_the_allocation() {
        let sampler = ThompsonSampler::new(10_000);
        let arms = vec![arm("control", 5_000, 120), arm("variant_a", 5_000, 150)];

        assert_eq!(sampler.allocate(&arms, 1234), sampler.allocate(&arms, 1234));
    }

    #[test]
    fn different_seeds_can_move_the_split() {
        let sampler = ThompsonSampler::new(1_000);
        let arms = vec![arm("control", 1_000, 30), arm("variant_a", 1_000, 32)];

        // Close race, coarse sampling: the split varies across seeds.
        let splits: std::collections::HashSet<String> = (0..10)
            .map(|seed| format!("{:?}", sampler.allocate(&arms, seed)["control"]))
            .collect();
        assert!(splits.len() > 1);
    }

    #[test]
    fn prior_only_arms_stay_near_uniform() {
        let sampler = ThompsonSampler::new(10_000);
        let prior = BetaParams {
            alpha: PRIOR_ALPHA,
            beta: PRIOR_BETA,
        };
        let arms: Vec<Arm> = ["control", "variant_a", "variant_b"]
            .iter()
            .map(|name| Arm {
                name: name.to_string(),
                impressions: 50,
                params: prior,
            })
            .collect();

        for seed in [11, 222, 3333] {
            let allocations = sampler.allocate(&arms, seed);
            for share in allocations.values() {
                assert!((share - 100.0 / 3.0).abs() < 5.0, "share {share} off uniform");
            }
        }
    }
}

//! Wilson score interval for binomial proportions.

/// Z-score for a 95% confidence interval.
pub const Z_95: f64 = 1.96;

/// 95% confidence interval for a proportion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilsonInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Wilson score interval for CTR.
///
/// Better behaved than the Wald interval near 0 and 1 and for small
/// samples. Bounds are clamped to [0, 1] and rounded to six decimals.
/// Returns `None` when there are no impressions.
pub fn wilson_score_interval(clicks: i64, impressions: i64) -> Option<WilsonInterval> {
    if impressions <= 0 {
        return None;
    }

    let n = impressions as f64;
    let p = clicks as f64 / n;
    let z = Z_95;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let margin = (z / denominator) * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();

    Some(WilsonInterval {
        lower: round6((center - margin).max(0.0)),
        upper: round6((center + margin).min(1.0)),
    })
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_impressions_has_no_interval() {
        assert_eq!(wilson_score_interval(0, 0), None);
    }

    #[test]
    fn interval_brackets_the_observed_rate() {
        let ci = wilson_score_interval(320, 10_000).unwrap();
        assert!(ci.lower < 0.032);
        assert!(ci.upper > 0.032);
        assert!(ci.lower > 0.0);
        assert!(ci.upper < 1.0);
    }

    #[test]
    fn zero_clicks_clamps_at_zero() {
        let ci = wilson_score_interval(0, 50).unwrap();
        assert_eq!(ci.lower, 0.0);
        assert!(ci.upper > 0.0);
    }

    #[test]
    fn all_clicks_clamps_at_one() {
        let ci = wilson_score_interval(50, 50).unwrap();
        assert!(ci.lower < 1.0);
        assert_eq!(ci.upper, 1.0);
    }

    #[test]
    fn narrows_with_sample_size() {
        let small = wilson_score_interval(10, 100).unwrap();
        let large = wilson_score_interval(1_000, 10_000).unwrap();
        assert!(large.upper - large.lower < small.upper - small.lower);
    }
}

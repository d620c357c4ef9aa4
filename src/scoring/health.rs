// League health: Gini coefficient over team CPR scores.

use crate::scoring::stats::clamp;

/// Gini coefficient of `values`, in [0, 1]. 0 is perfect parity, 1 is
/// total concentration.
///
/// Uses the rank-weighted form over ascending-sorted values:
/// `gini = (n + 1 - 2 * sum((n + 1 - i) * x_i) / sum(x)) / n` with 1-based
/// `i`. Empty input or an all-zero total scores 0 (parity by convention).
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n_f = n as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (n_f + 1.0 - (i + 1) as f64) * x)
        .sum();

    clamp((n_f + 1.0 - 2.0 * weighted / total) / n_f, 0.0, 1.0)
}

/// League health is the complement of inequality: `1 - gini`.
pub fn league_health(gini: f64) -> f64 {
    1.0 - gini
}

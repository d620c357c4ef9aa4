// Pool statistics shared by the scoring pipeline: mean/stdev, z-scores,
// and order statistics (median, quantiles).

/// Below this standard deviation a pool is treated as degenerate and all
/// z-scores in it collapse to 0.0.
pub const STDEV_EPSILON: f64 = 1e-9;

/// Mean and population standard deviation for a pool of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
    pub count: usize,
}

impl PoolStats {
    pub fn empty() -> Self {
        PoolStats {
            mean: 0.0,
            stdev: 0.0,
            count: 0,
        }
    }
}

/// Compute mean and population standard deviation over `values`.
/// An empty pool yields `PoolStats::empty()`.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats::empty();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    PoolStats {
        mean,
        stdev: variance.sqrt(),
        count: values.len(),
    }
}

/// Z-score of `value` against its pool. Degenerate pools (stdev below
/// `STDEV_EPSILON`) map every value to 0.0 rather than +/- infinity.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Median of `values`. Empty input yields 0.0.
pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Linear-interpolated quantile of `values` for `q` in [0, 1].
/// Empty input yields 0.0; a single value is every quantile of itself.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Clamp `value` into `[lo, hi]`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn pool_stats_basic() {
        let values = vec![2.0, 4.0, 6.0, 8.0];
        let stats = compute_pool_stats(&values);
        assert!(approx_eq(stats.mean, 5.0, 1e-9));
        // Population stdev of [2,4,6,8] is sqrt(5).
        assert!(approx_eq(stats.stdev, 5.0_f64.sqrt(), 1e-9));
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn pool_stats_empty() {
        let stats = compute_pool_stats(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn zscore_centers_and_scales() {
        let stats = compute_pool_stats(&[10.0, 20.0, 30.0]);
        assert!(approx_eq(compute_zscore(20.0, &stats), 0.0, 1e-9));
        assert!(compute_zscore(30.0, &stats) > 0.0);
        assert!(compute_zscore(10.0, &stats) < 0.0);
    }

    #[test]
    fn zscore_degenerate_pool_is_zero() {
        let stats = compute_pool_stats(&[7.5, 7.5, 7.5]);
        assert_eq!(compute_zscore(7.5, &stats), 0.0);
        assert_eq!(compute_zscore(100.0, &stats), 0.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert!(approx_eq(median(&[3.0, 1.0, 2.0]), 2.0, 1e-9));
        assert!(approx_eq(median(&[4.0, 1.0, 3.0, 2.0]), 2.5, 1e-9));
        assert_eq!(median(&[]), 0.0);
        assert!(approx_eq(median(&[9.0]), 9.0, 1e-9));
    }

    #[test]
    fn quantile_interpolates() {
        let values = vec![0.0, 10.0, 20.0, 30.0, 40.0];
        assert!(approx_eq(quantile(&values, 0.0), 0.0, 1e-9));
        assert!(approx_eq(quantile(&values, 1.0), 40.0, 1e-9));
        assert!(approx_eq(quantile(&values, 0.9), 36.0, 1e-9));
        // Unsorted input is handled.
        let shuffled = vec![30.0, 0.0, 40.0, 10.0, 20.0];
        assert!(approx_eq(quantile(&shuffled, 0.9), 36.0, 1e-9));
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.3, 0.0, 1.0), 0.3);
    }
}

// Small numeric helpers shared by the valuation and league analyses.
//
// Every function here is total: empty inputs and degenerate spreads produce
// a documented default (0.0 or `None`) instead of NaN or a panic.

/// Threshold below which a spread is treated as zero.
pub const STDEV_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation for a single category across a cohort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Mean and population standard deviation (N denominator) of `values`.
///
/// Returns `PoolStats { mean: 0.0, stdev: 0.0 }` for an empty slice.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Standard score of `value` against `stats`; 0.0 when the spread is
/// (approximately) zero.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

// ---------------------------------------------------------------------------
// Location summaries
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N - 1 denominator); `None` below two values.
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Median with the midpoint rule for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Streaming Pearson correlation.
///
/// Zero-valued pairs only bump the count, so a sparse series can feed its
/// nonzero pairs through `push` and account for the rest with `push_zeros`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonAccumulator {
    n: u64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl PearsonAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    /// Record `count` observations of the pair (0.0, 0.0).
    pub fn push_zeros(&mut self, count: u64) {
        self.n += count;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    /// Correlation coefficient, or `None` with fewer than 2 observations or
    /// when either side has no spread.
    pub fn finish(&self) -> Option<f64> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let cov = self.sum_xy - self.sum_x * self.sum_y / n;
        let var_x = self.sum_xx - self.sum_x * self.sum_x / n;
        let var_y = self.sum_yy - self.sum_y * self.sum_y / n;
        if var_x <= STDEV_EPSILON * STDEV_EPSILON || var_y <= STDEV_EPSILON * STDEV_EPSILON {
            return None;
        }
        let r = cov / (var_x.sqrt() * var_y.sqrt());
        if r.is_finite() {
            Some(r.clamp(-1.0, 1.0))
        } else {
            None
        }
    }
}

/// Pearson correlation of two equal-length slices.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    let mut acc = PearsonAccumulator::new();
    for (a, b) in x.iter().zip(y) {
        acc.push(*a, *b);
    }
    acc.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn pool_stats_known_values() {
        // Mean 5, population variance 32/8 = 4, stdev 2.
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_pool_stats(&values);
        assert!(approx_eq(stats.mean, 5.0, 1e-10));
        assert!(approx_eq(stats.stdev, 2.0, 1e-10));
    }

    #[test]
    fn pool_stats_single_value() {
        let stats = compute_pool_stats(&[42.0]);
        assert!(approx_eq(stats.mean, 42.0, 1e-10));
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn pool_stats_empty() {
        let stats = compute_pool_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn zscore_known_inputs() {
        let stats = PoolStats {
            mean: 5.0,
            stdev: 2.0,
        };
        assert!(approx_eq(compute_zscore(9.0, &stats), 2.0, 1e-10));
        assert!(approx_eq(compute_zscore(1.0, &stats), -2.0, 1e-10));
        assert!(approx_eq(compute_zscore(5.0, &stats), 0.0, 1e-10));
    }

    #[test]
    fn zscore_near_zero_stdev_returns_zero() {
        let stats = PoolStats {
            mean: 10.0,
            stdev: 1e-12,
        };
        assert_eq!(compute_zscore(100.0, &stats), 0.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn sample_stdev_uses_n_minus_one() {
        // Deviations -2, 0, 2: sum of squares 8 over 2.
        assert!(approx_eq(sample_stdev(&[3.0, 5.0, 7.0]).unwrap(), 2.0, 1e-12));
        assert_eq!(sample_stdev(&[4.0]), None);
        assert_eq!(sample_stdev(&[]), None);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!(approx_eq(pearson(&x, &y).unwrap(), 1.0, 1e-12));
        assert!(approx_eq(pearson(&x, &z).unwrap(), -1.0, 1e-12));
    }

    #[test]
    fn pearson_undefined_cases() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn push_zeros_matches_explicit_zero_pairs() {
        let mut sparse = PearsonAccumulator::new();
        sparse.push(1.0, 2.0);
        sparse.push(3.0, 1.0);
        sparse.push_zeros(3);

        let dense = pearson(&[1.0, 3.0, 0.0, 0.0, 0.0], &[2.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(sparse.count(), 5);
        assert!(approx_eq(sparse.finish().unwrap(), dense, 1e-12));
    }
}

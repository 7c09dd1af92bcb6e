//! Missing-value aware statistical helpers for forecast archives.
//!
//! Missing data is represented as `NaN` throughout the workspace. The `nan_*`
//! functions skip non-finite values and return `NaN` when nothing is left,
//! so an all-missing group never turns into a zero.

/// Copies the finite values of `data` into a sorted vector.
pub fn finite_sorted(data: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out
}

/// Number of finite values in `data`.
pub fn count_finite(data: &[f64]) -> usize {
    data.iter().filter(|x| x.is_finite()).count()
}

/// Arithmetic mean of the finite values. Returns `NaN` if there are none.
pub fn nan_mean(data: &[f64]) -> f64 {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0_usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Variance of the finite values with `N - ddof` denominator.
///
/// Returns `NaN` if fewer than `ddof + 1` finite values remain.
pub fn nan_variance(data: &[f64], ddof: usize) -> f64 {
    let n = count_finite(data);
    if n <= ddof {
        return f64::NAN;
    }
    let mean = nan_mean(data);
    let ss: f64 = data
        .iter()
        .filter(|x| x.is_finite())
        .map(|&x| (x - mean) * (x - mean))
        .sum();
    ss / (n - ddof) as f64
}

/// Population standard deviation (`ddof = 0`) of the finite values.
///
/// A single finite value gives `0.0`; no finite values give `NaN`.
pub fn nan_std(data: &[f64]) -> f64 {
    nan_variance(data, 0).sqrt()
}

/// Minimum of the finite values. Returns `NaN` if there are none.
pub fn nan_min(data: &[f64]) -> f64 {
    data.iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Maximum of the finite values. Returns `NaN` if there are none.
pub fn nan_max(data: &[f64]) -> f64 {
    data.iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

/// R's default quantile algorithm (type=7), also numpy's `linear` method.
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Type-7 quantile of the finite values. Returns `NaN` if there are none.
pub fn nan_quantile(data: &[f64], p: f64) -> f64 {
    let sorted = finite_sorted(data);
    if sorted.is_empty() {
        f64::NAN
    } else {
        quantile_type7(&sorted, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_finite_sorted() {
        assert_eq!(finite_sorted(&[3.0, NAN, 1.0, f64::INFINITY, 2.0]), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nan_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(nan_mean(&data), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_mean_skips_missing() {
        assert_relative_eq!(nan_mean(&[1.0, NAN, 3.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_mean_all_missing() {
        assert!(nan_mean(&[NAN, NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn test_nan_std_population() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(nan_std(&data), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_variance_sample() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // R: var(c(2,4,4,4,5,5,7,9)) = 4.571429
        assert_relative_eq!(nan_variance(&data, 1), 4.571429, epsilon = 1e-6);
    }

    #[test]
    fn test_nan_std_single_value() {
        assert_eq!(nan_std(&[5.0, NAN]), 0.0);
    }

    #[test]
    fn test_nan_std_all_missing() {
        assert!(nan_std(&[NAN]).is_nan());
    }

    #[test]
    fn test_nan_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8
        assert_relative_eq!(nan_variance(&[3.0, 7.0], 0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(nan_variance(&[3.0, 7.0], 1), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_min_max() {
        let data = [NAN, -1.5, 4.0, 2.0];
        assert_eq!(nan_min(&data), -1.5);
        assert_eq!(nan_max(&data), 4.0);
        assert!(nan_min(&[NAN]).is_nan());
        assert!(nan_max(&[]).is_nan());
    }

    #[test]
    fn test_quantile_type7() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_type7(&sorted, 0.25), 2.0, epsilon = 1e-12);
        assert_relative_eq!(quantile_type7(&sorted, 0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(quantile_type7(&sorted, 1.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_type7_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        // p=0.1 → h=0.4, lo=0, hi=1 → 1 + 0.4*(2-1) = 1.4
        assert_relative_eq!(quantile_type7(&sorted, 0.1), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_type7_r_crossvalidation() {
        // R: quantile(1:10, 0.3, type=7) = 3.7
        let sorted: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert_relative_eq!(quantile_type7(&sorted, 0.3), 3.7, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_quantile() {
        let data = [5.0, NAN, 1.0, 3.0, 2.0, 4.0];
        assert_relative_eq!(nan_quantile(&data, 0.5), 3.0, epsilon = 1e-12);
        assert!(nan_quantile(&[NAN], 0.5).is_nan());
        // even length averages the middle pair
        assert_relative_eq!(nan_quantile(&[4.0, 1.0, 3.0, 2.0], 0.5), 2.5, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "quantile_type7: input must not be empty")]
    fn test_quantile_type7_empty_panics() {
        quantile_type7(&[], 0.5);
    }
}

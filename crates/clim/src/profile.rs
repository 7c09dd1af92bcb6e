//! One-dimensional profile operations: smoothing and gap filling.

use s2s_stats::nan_mean;

/// Centered running mean of width `width`, NaN-skipping, `min_periods = 1`.
///
/// The window for position `i` spans `i - width / 2 ..= i - width / 2 + width - 1`,
/// clipped to the series. It is positional: neighbouring entries are averaged
/// regardless of the spacing of their keys. A window without any finite value
/// yields `NaN`.
pub(crate) fn centered_rolling_mean(values: &[f64], width: usize) -> Vec<f64> {
    let n = values.len();
    let half = width / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + width - half).min(n);
            nan_mean(&values[lo..hi])
        })
        .collect()
}

/// Linearly interpolates the finite points `(xs, ys)` onto `targets`,
/// extending the trend of the two outermost points beyond either end.
///
/// A single finite point is extended as a constant; none yields `NaN`.
/// `xs` must be strictly ascending.
pub(crate) fn interp_extrapolate(xs: &[i64], ys: &[f64], targets: &[i64]) -> Vec<f64> {
    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(_, y)| y.is_finite())
        .map(|(&x, &y)| (x as f64, y))
        .collect();

    let line = |(x0, y0): (f64, f64), (x1, y1): (f64, f64), x: f64| {
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    };

    targets
        .iter()
        .map(|&t| {
            let x = t as f64;
            match points.as_slice() {
                [] => f64::NAN,
                [(_, y)] => *y,
                [first, second, ..] if x <= first.0 => line(*first, *second, x),
                [.., penultimate, last] if x >= last.0 => line(*penultimate, *last, x),
                _ => {
                    // x lies strictly inside the range of the points.
                    let upper = points.partition_point(|p| p.0 < x);
                    if points[upper].0 == x {
                        points[upper].1
                    } else {
                        line(points[upper - 1], points[upper], x)
                    }
                }
            }
        })
        .collect()
}

//! Probabilities of extremes after events.
//!
//! A value is extreme when it lies beyond a threshold, on the side given by
//! the threshold's sign: below a non-positive threshold, above a positive
//! one.

use std::ops::RangeInclusive;

use rand::Rng;
use rayon::prelude::*;
use s2s_forecast::{Forecast, ForecastError};
use tracing::debug;

use crate::composite::Composite;
use crate::error::EventError;

/// `true` if `value` lies beyond `threshold`. Missing values are never extreme.
pub fn is_extreme(value: f64, threshold: f64) -> bool {
    if threshold <= 0.0 {
        value < threshold
    } else {
        value > threshold
    }
}

/// Fraction of members that are extreme at each lagtime, among members with
/// data at that lagtime. Lagtimes without data yield `NaN`.
pub fn extreme_fractions(
    composite: &Composite,
    cell: usize,
    threshold: f64,
) -> Result<Vec<f64>, EventError> {
    check_cell(composite, cell)?;
    let values = composite.values();
    Ok((0..composite.lagtimes().len())
        .map(|k| {
            let column: Vec<f64> = (0..composite.len()).map(|i| values[[i, k, cell]]).collect();
            let n_valid = column.iter().filter(|v| v.is_finite()).count();
            let n_extreme = column.iter().filter(|&&v| is_extreme(v, threshold)).count();
            if n_valid == 0 {
                f64::NAN
            } else {
                n_extreme as f64 / n_valid as f64
            }
        })
        .collect())
}

/// Probability that a member becomes extreme at least once within `lagtimes`.
///
/// Lag days are visited in order. On each day, members already counted as
/// extreme are excluded; the probability of a new extreme is the number of
/// new extremes over the members still in play that have data. The daily
/// probabilities combine to `1 - Π(1 - p_d)`. A day with no members in play
/// contributes `p_d = 0`.
pub fn integrated_extreme_probability(
    composite: &Composite,
    cell: usize,
    lagtimes: RangeInclusive<i64>,
    threshold: f64,
) -> Result<f64, EventError> {
    check_cell(composite, cell)?;
    let values = composite.values();
    let mut excluded = vec![false; composite.len()];
    let mut survival = 1.0;

    for (k, _) in composite
        .lagtimes()
        .iter()
        .enumerate()
        .filter(|(_, lag)| lagtimes.contains(lag))
    {
        let mut in_play = 0usize;
        let mut new_extremes = Vec::new();
        for (i, &done) in excluded.iter().enumerate() {
            let v = values[[i, k, cell]];
            if done || !v.is_finite() {
                continue;
            }
            in_play += 1;
            if is_extreme(v, threshold) {
                new_extremes.push(i);
            }
        }
        let p = if in_play == 0 {
            0.0
        } else {
            new_extremes.len() as f64 / in_play as f64
        };
        survival *= 1.0 - p;
        for i in new_extremes {
            excluded[i] = true;
        }
    }
    Ok(1.0 - survival)
}

/// Settings for [`bootstrap_extreme_probability`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapConfig {
    sample_size: usize,
    n_samples: usize,
    alpha: f64,
}

impl BootstrapConfig {
    /// Creates settings drawing `sample_size` forecasts per sample, with
    /// 1000 samples and a 95 % confidence interval.
    pub fn new(sample_size: usize) -> Self {
        Self {
            sample_size,
            n_samples: 1000,
            alpha: 0.05,
        }
    }

    pub fn with_n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Sets the two-sided significance level of the interval.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.sample_size == 0 || self.n_samples == 0 {
            return Err(EventError::InvalidConfig {
                reason: "sample_size and n_samples must be >= 1".to_string(),
            });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(EventError::InvalidConfig {
                reason: format!("alpha must be in (0, 1), got {}", self.alpha),
            });
        }
        Ok(())
    }
}

/// Mean and confidence interval of a resampled probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapEstimate {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Resamples the chance that a randomly drawn forecast is extreme at least
/// once within `leadtimes`.
///
/// The population is every forecast of the scalar series `population` with
/// any data. Each sample draws `sample_size` of them with replacement and
/// records the fraction that turn extreme. The interval bounds are the
/// smallest and largest sampled fractions whose empirical CDF lies strictly
/// between `alpha / 2` and `1 - alpha / 2`.
///
/// # Errors
///
/// Returns [`EventError::InvalidConfig`], [`EventError::NotScalar`], or
/// [`EventError::EmptyPopulation`] if no forecast has data.
#[tracing::instrument(skip_all, fields(sample_size = config.sample_size(), n_samples = config.n_samples()))]
pub fn bootstrap_extreme_probability<R: Rng>(
    population: &Forecast,
    leadtimes: RangeInclusive<i64>,
    threshold: f64,
    config: &BootstrapConfig,
    rng: &mut R,
) -> Result<BootstrapEstimate, EventError> {
    config.validate()?;
    if population.n_cells() != 1 {
        return Err(EventError::NotScalar {
            n_cells: population.n_cells(),
        });
    }

    let (n_ref, n_hcy, n_num) = (
        population.reftimes().len(),
        population.hc_years().len(),
        population.numbers().len(),
    );
    let lead = population.leadtimes();
    let flags: Vec<bool> = (0..n_ref * n_hcy * n_num)
        .into_par_iter()
        .filter_map(|flat| {
            let (ri, rest) = (flat / (n_hcy * n_num), flat % (n_hcy * n_num));
            let series = population.series(ri, rest / n_num, rest % n_num);
            let column = series.column(0);
            if !column.iter().any(|v| v.is_finite()) {
                return None;
            }
            Some(
                lead.iter()
                    .zip(column.iter())
                    .any(|(l, &v)| leadtimes.contains(l) && is_extreme(v, threshold)),
            )
        })
        .collect();
    if flags.is_empty() {
        return Err(EventError::EmptyPopulation);
    }
    debug!(
        n_population = flags.len(),
        n_extreme = flags.iter().filter(|&&f| f).count(),
        "bootstrap population"
    );

    let mut fractions: Vec<f64> = (0..config.n_samples)
        .map(|_| {
            let hits = (0..config.sample_size)
                .filter(|_| flags[rng.random_range(0..flags.len())])
                .count();
            hits as f64 / config.sample_size as f64
        })
        .collect();

    let mean = fractions.iter().sum::<f64>() / fractions.len() as f64;
    fractions.sort_by(f64::total_cmp);
    let n = fractions.len() as f64;
    let cdf = |i: usize| i as f64 / n;
    let (lo_cut, hi_cut) = (config.alpha / 2.0, 1.0 - config.alpha / 2.0);
    let inside: Vec<usize> = (0..fractions.len())
        .filter(|&i| cdf(i) > lo_cut && cdf(i) < hi_cut)
        .collect();
    let (lower, upper) = match (inside.first(), inside.last()) {
        (Some(&a), Some(&b)) => (fractions[a], fractions[b]),
        _ => (fractions[0], fractions[fractions.len() - 1]),
    };

    Ok(BootstrapEstimate { mean, lower, upper })
}

fn check_cell(composite: &Composite, cell: usize) -> Result<(), EventError> {
    if cell < composite.n_cells() {
        Ok(())
    } else {
        Err(ForecastError::IndexOutOfBounds {
            axis: "cell",
            index: cell,
            len: composite.n_cells(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::composite;
    use crate::event::Event;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::Array5;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NAN: f64 = f64::NAN;

    /// One realtime forecast per row; every event triggers on day 0.
    fn forecast(rows: &[&[f64]]) -> Forecast {
        let n_lead = rows[0].len();
        let values = Array5::from_shape_fn((1, 1, rows.len(), n_lead, 1), |(_, _, n, l, _)| {
            rows[n][l]
        });
        Forecast::new(
            vec![NaiveDate::from_ymd_opt(2018, 2, 1).unwrap()],
            vec![0],
            (0..rows.len() as u32).collect(),
            (0..n_lead as i64).collect(),
            values,
        )
        .unwrap()
    }

    fn composite_of(rows: &[&[f64]]) -> Composite {
        let fc = forecast(rows);
        let events: Vec<Event> = fc
            .numbers()
            .iter()
            .map(|&n| Event::new(fc.reftimes()[0], 0, n, 0))
            .collect();
        composite(&events, &fc).unwrap()
    }

    fn sample_rows() -> Composite {
        composite_of(&[&[11.0, 11.0, 0.0], &[0.0, 12.0, NAN], &[0.0, 0.0, 15.0]])
    }

    #[test]
    fn threshold_sign_picks_side() {
        assert!(is_extreme(-25.0, -20.0));
        assert!(!is_extreme(-10.0, -20.0));
        assert!(is_extreme(-0.1, 0.0));
        assert!(is_extreme(11.0, 10.0));
        assert!(!is_extreme(10.0, 10.0));
        assert!(!is_extreme(NAN, 10.0));
        assert!(!is_extreme(NAN, -10.0));
    }

    #[test]
    fn fractions_per_lagtime() {
        let f = extreme_fractions(&sample_rows(), 0, 10.0).unwrap();
        assert_relative_eq!(f[0], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(f[1], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(f[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn integrated_excludes_counted_members() {
        let comp = sample_rows();
        // p = 1/3, then 1/2 of the two left, then the last one.
        let p = integrated_extreme_probability(&comp, 0, 0..=1, 10.0).unwrap();
        assert_relative_eq!(p, 1.0 - (2.0 / 3.0) * 0.5, epsilon = 1e-12);
        let p = integrated_extreme_probability(&comp, 0, 0..=2, 10.0).unwrap();
        assert_relative_eq!(p, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn integrated_empty_range_is_zero() {
        let p = integrated_extreme_probability(&sample_rows(), 0, 10..=20, 10.0).unwrap();
        assert_eq!(p, 0.0);
    }

    #[test]
    fn bad_cell() {
        assert!(matches!(
            extreme_fractions(&sample_rows(), 1, 10.0),
            Err(EventError::Forecast(ForecastError::IndexOutOfBounds { .. }))
        ));
    }

    #[test]
    fn bootstrap_degenerate_populations() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = BootstrapConfig::new(5).with_n_samples(50);
        let all = forecast(&[&[20.0, 1.0], &[1.0, 30.0]]);
        let est = bootstrap_extreme_probability(&all, 0..=1, 10.0, &config, &mut rng).unwrap();
        assert_eq!(est, BootstrapEstimate { mean: 1.0, lower: 1.0, upper: 1.0 });

        let none = forecast(&[&[1.0, 1.0], &[1.0, 30.0]]);
        let est = bootstrap_extreme_probability(&none, 0..=0, 10.0, &config, &mut rng).unwrap();
        assert_eq!(est.mean, 0.0);
        assert_eq!(est.upper, 0.0);
    }

    #[test]
    fn bootstrap_interval_brackets_mean() {
        let mut rng = StdRng::seed_from_u64(42);
        // Two of four forecasts turn extreme; one forecast has no data.
        let fc = forecast(&[&[20.0, 1.0], &[1.0, 1.0], &[1.0, 30.0], &[2.0, 2.0], &[NAN, NAN]]);
        let config = BootstrapConfig::new(40).with_n_samples(2000);
        let est = bootstrap_extreme_probability(&fc, 0..=1, 10.0, &config, &mut rng).unwrap();
        assert!((est.mean - 0.5).abs() < 0.02, "mean {}", est.mean);
        assert!(est.lower < est.mean && est.mean < est.upper);
        assert!(est.lower > 0.25 && est.upper < 0.75);
    }

    #[test]
    fn bootstrap_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let fc = forecast(&[&[NAN, NAN]]);
        assert_eq!(
            bootstrap_extreme_probability(&fc, 0..=1, 10.0, &BootstrapConfig::new(3), &mut rng)
                .unwrap_err(),
            EventError::EmptyPopulation
        );
        assert!(BootstrapConfig::new(0).validate().is_err());
        assert!(BootstrapConfig::new(3).with_alpha(1.0).validate().is_err());
    }
}

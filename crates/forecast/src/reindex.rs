//! Re-indexing a flat time axis onto `(reftime, hc_year, leadtime)`.

use chrono::{Datelike, NaiveDate};
use ndarray::{Array2, Array5};
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::error::ForecastError;
use crate::filename::infer_reftime_from_filename;
use crate::forecast::Forecast;
use crate::raw::RawForecast;

/// Configuration for [`reindex`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReindexConfig {
    max_realtime_steps: usize,
    min_gap_days: i64,
    reftime: Option<NaiveDate>,
    suppress_warnings: bool,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReindexConfig {
    /// Creates a config with the defaults: files with fewer than 100 time
    /// steps are real-time forecasts, and hindcast years are separated by
    /// gaps of more than 10 days.
    pub fn new() -> Self {
        Self {
            max_realtime_steps: 100,
            min_gap_days: 10,
            reftime: None,
            suppress_warnings: false,
        }
    }

    /// Sets the time-step count below which a file is a real-time forecast.
    pub fn with_max_realtime_steps(mut self, steps: usize) -> Self {
        self.max_realtime_steps = steps;
        self
    }

    /// Sets the gap (in days) that separates hindcast years.
    pub fn with_min_gap_days(mut self, days: i64) -> Self {
        self.min_gap_days = days;
        self
    }

    /// Fixes the reftime instead of inferring it.
    pub fn with_reftime(mut self, reftime: NaiveDate) -> Self {
        self.reftime = Some(reftime);
        self
    }

    /// Silences the `warn!` emitted for diagnostics.
    pub fn with_suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }

    /// Time-step count below which a file is a real-time forecast.
    pub fn max_realtime_steps(&self) -> usize {
        self.max_realtime_steps
    }

    /// Gap in days separating hindcast years.
    pub fn min_gap_days(&self) -> i64 {
        self.min_gap_days
    }

    /// Fixed reftime, if any.
    pub fn reftime(&self) -> Option<NaiveDate> {
        self.reftime
    }

    /// Whether diagnostic warnings are silenced.
    pub fn suppress_warnings(&self) -> bool {
        self.suppress_warnings
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidConfig`] if `max_realtime_steps` is zero
    /// or `min_gap_days` is negative.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.max_realtime_steps == 0 {
            return Err(ForecastError::InvalidConfig {
                reason: "max_realtime_steps must be positive".to_string(),
            });
        }
        if self.min_gap_days < 0 {
            return Err(ForecastError::InvalidConfig {
                reason: format!("min_gap_days must be non-negative, got {}", self.min_gap_days),
            });
        }
        Ok(())
    }
}

/// A re-indexed forecast together with the raw time stamps.
#[derive(Debug, Clone)]
pub struct Reindexed {
    forecast: Forecast,
    validtime: Array2<NaiveDate>,
    diagnostics: Vec<Diagnostic>,
}

impl Reindexed {
    /// The forecast on canonical axes, with a single reftime.
    pub fn forecast(&self) -> &Forecast {
        &self.forecast
    }

    /// Raw time stamps shaped `(hc_year, leadtime)`.
    pub fn validtime(&self) -> &Array2<NaiveDate> {
        &self.validtime
    }

    /// Diagnostics recorded while re-indexing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes self and returns the forecast.
    pub fn into_forecast(self) -> Forecast {
        self.forecast
    }
}

/// Re-indexes a raw forecast onto `(reftime, hc_year, number, leadtime, cell)`.
///
/// Files with fewer than `max_realtime_steps` time steps are real-time
/// forecasts: `hc_year = 0` and leadtimes count from the first time step.
/// Longer files are hindcasts, split into one segment per year wherever two
/// consecutive time steps are more than `min_gap_days` apart. All segments
/// must have the length of the first one, whose offsets become the leadtime
/// axis; `hc_year` is each segment's start year minus the reftime year.
///
/// The reftime is taken from the config, else inferred from the source file
/// name, else defaults to the first time step (real-time) or the start of the
/// last segment (hindcast). Falling back to the default records
/// [`Diagnostic::ReftimeNotInferred`].
///
/// # Errors
///
/// Returns [`ForecastError::InvalidConfig`] for a bad config and
/// [`ForecastError::SegmentLengthMismatch`] if the hindcast cannot be split
/// into equal segments.
#[tracing::instrument(skip_all, fields(source = raw.source(), n_time = raw.time().len()))]
pub fn reindex(raw: &RawForecast, config: &ReindexConfig) -> Result<Reindexed, ForecastError> {
    config.validate()?;

    let time = raw.time();
    let n_time = time.len();
    let (n_members, _, n_cells) = raw.values().dim();

    let mut diagnostics = Vec::new();
    let explicit = config
        .reftime()
        .or_else(|| raw.source().and_then(infer_reftime_from_filename));
    if explicit.is_none() {
        let diagnostic = Diagnostic::ReftimeNotInferred {
            source: raw.source().map(str::to_string),
        };
        diagnostic.emit_unless(config.suppress_warnings());
        diagnostics.push(diagnostic);
    }

    let (segment, n_segments, reftime) = if n_time < config.max_realtime_steps() {
        (n_time, 1, explicit.unwrap_or(time[0]))
    } else {
        let starts: Vec<usize> = std::iter::once(0)
            .chain((1..n_time).filter(|&i| (time[i] - time[i - 1]).num_days() > config.min_gap_days()))
            .collect();
        let segment = starts.get(1).copied().unwrap_or(n_time);
        if n_time % segment != 0 {
            return Err(ForecastError::SegmentLengthMismatch {
                total: n_time,
                segment,
            });
        }
        let last_start = starts.last().copied().unwrap_or(0);
        (segment, n_time / segment, explicit.unwrap_or(time[last_start]))
    };

    let realtime = n_time < config.max_realtime_steps();
    let hc_years: Vec<i32> = if realtime {
        vec![0]
    } else {
        (0..n_segments)
            .map(|s| time[s * segment].year() - reftime.year())
            .collect()
    };
    let leadtimes: Vec<i64> = time[..segment]
        .iter()
        .map(|t| (*t - time[0]).num_days())
        .collect();
    debug!(
        realtime,
        n_segments,
        segment,
        %reftime,
        "classified raw forecast"
    );

    let raw_values = raw.values();
    let values = Array5::from_shape_fn(
        (1, n_segments, n_members, segment, n_cells),
        |(_, s, m, l, c)| raw_values[[m, s * segment + l, c]],
    );
    let validtime = Array2::from_shape_fn((n_segments, segment), |(s, l)| time[s * segment + l]);

    let forecast = Forecast::new(
        vec![reftime],
        hc_years,
        raw.numbers().to_vec(),
        leadtimes,
        values,
    )?;

    Ok(Reindexed {
        forecast,
        validtime,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        start.iter_days().take(n).collect()
    }

    fn hindcast_time(reftime: NaiveDate, years: &[i32], n: usize) -> Vec<NaiveDate> {
        years
            .iter()
            .flat_map(|&y| run(s2s_calendar::add_years(reftime, y).unwrap(), n))
            .collect()
    }

    #[test]
    fn realtime_from_time_axis() {
        let time = run(ymd(2020, 1, 2), 5);
        let values = Array2::from_shape_fn((5, 1), |(t, _)| t as f64);
        let raw = RawForecast::new(time, values).unwrap();

        let out = reindex(&raw, &ReindexConfig::new().with_suppress_warnings(true)).unwrap();
        let fc = out.forecast();
        assert_eq!(fc.reftimes(), &[ymd(2020, 1, 2)]);
        assert_eq!(fc.hc_years(), &[0]);
        assert_eq!(fc.numbers(), &[0]);
        assert_eq!(fc.leadtimes(), &[0, 1, 2, 3, 4]);
        assert_eq!(fc.values()[[0, 0, 0, 3, 0]], 3.0);
        assert_eq!(out.diagnostics().len(), 1);
        assert!(matches!(
            out.diagnostics()[0],
            Diagnostic::ReftimeNotInferred { source: None }
        ));
    }

    #[test]
    fn realtime_reftime_from_filename() {
        let raw = RawForecast::new(run(ymd(2020, 1, 2), 3), Array2::zeros((3, 1)))
            .unwrap()
            .with_source("t2m_20200102_cf.nc");
        let out = reindex(&raw, &ReindexConfig::new()).unwrap();
        assert_eq!(out.forecast().reftimes(), &[ymd(2020, 1, 2)]);
        assert!(out.diagnostics().is_empty());
    }

    #[test]
    fn hindcast_segments() {
        let reftime = ymd(2020, 1, 2);
        let years = [-3, -2, -1];
        let time = hindcast_time(reftime, &years, 4);
        let n = time.len();
        let values = Array2::from_shape_fn((n, 1), |(t, _)| t as f64);
        let raw = RawForecast::new(time, values).unwrap();

        let config = ReindexConfig::new().with_max_realtime_steps(10);
        let out = reindex(&raw, &config).unwrap();
        let fc = out.forecast();

        // No file name: the reftime defaults to the start of the last segment.
        assert_eq!(fc.reftimes(), &[ymd(2019, 1, 2)]);
        assert_eq!(fc.hc_years(), &[-2, -1, 0]);
        assert_eq!(fc.leadtimes(), &[0, 1, 2, 3]);
        assert_eq!(fc.values()[[0, 1, 0, 2, 0]], 6.0);
        assert_eq!(out.validtime().dim(), (3, 4));
    }

    #[test]
    fn hindcast_with_explicit_reftime() {
        let reftime = ymd(2020, 1, 2);
        let time = hindcast_time(reftime, &[-2, -1], 6);
        let raw = RawForecast::new(time, Array2::zeros((12, 2))).unwrap();
        let config = ReindexConfig::new()
            .with_max_realtime_steps(10)
            .with_reftime(reftime);
        let out = reindex(&raw, &config).unwrap();
        assert_eq!(out.forecast().hc_years(), &[-2, -1]);
        assert!(out.diagnostics().is_empty());
    }

    #[test]
    fn hindcast_segment_mismatch() {
        let reftime = ymd(2020, 1, 2);
        let mut time = hindcast_time(reftime, &[-2], 4);
        time.extend(run(ymd(2019, 1, 2), 5));
        let raw = RawForecast::new(time, Array2::zeros((9, 1))).unwrap();
        let err = reindex(&raw, &ReindexConfig::new().with_max_realtime_steps(5)).unwrap_err();
        assert_eq!(
            err,
            ForecastError::SegmentLengthMismatch {
                total: 9,
                segment: 4
            }
        );
    }

    #[test]
    fn hindcast_without_gap_is_one_segment() {
        let time = run(ymd(2000, 1, 1), 12);
        let raw = RawForecast::new(time, Array2::zeros((12, 1))).unwrap();
        let config = ReindexConfig::new()
            .with_max_realtime_steps(10)
            .with_reftime(ymd(2001, 1, 1));
        let out = reindex(&raw, &config).unwrap();
        assert_eq!(out.forecast().hc_years(), &[-1]);
        assert_eq!(out.forecast().leadtimes().len(), 12);
    }

    #[test]
    fn invalid_config() {
        let raw = RawForecast::new(run(ymd(2020, 1, 2), 3), Array2::zeros((3, 1))).unwrap();
        let config = ReindexConfig::new().with_max_realtime_steps(0);
        assert!(matches!(
            reindex(&raw, &config),
            Err(ForecastError::InvalidConfig { .. })
        ));
    }
}

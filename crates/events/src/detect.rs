//! Threshold-crossing event detection.
//!
//! A forecast qualifies when its series stays strictly positive over the
//! first leadtimes and later drops below zero. The first negative leadtime
//! inside the buffered search range is the event's trigger day. Sudden
//! stratospheric warmings detected from the zonal-mean zonal wind at 60°N
//! and 10 hPa are the canonical example.

use rayon::prelude::*;
use s2s_forecast::Forecast;
use tracing::info;

use crate::error::EventError;
use crate::event::Event;

/// Minimum drop of the series around the trigger day.
///
/// The value `window` days before the trigger day minus the value `window`
/// days after must exceed `min_change`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSize {
    window: i64,
    min_change: f64,
}

impl EffectSize {
    /// Creates an effect-size requirement.
    pub fn new(window: i64, min_change: f64) -> Self {
        Self { window, min_change }
    }

    /// Returns the half-width in days.
    pub fn window(&self) -> i64 {
        self.window
    }

    /// Returns the required drop.
    pub fn min_change(&self) -> f64 {
        self.min_change
    }
}

impl Default for EffectSize {
    /// A 20 unit drop over ±5 days.
    fn default() -> Self {
        Self::new(5, 20.0)
    }
}

/// Configuration for [`find_threshold_event`].
///
/// # Example
///
/// ```
/// use s2s_events::{EffectSize, EventConfig};
///
/// let config = EventConfig::new()
///     .with_buffer_start(5)
///     .with_effect_size(Some(EffectSize::default()));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.buffer_end(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EventConfig {
    /// Earliest leadtime at which a trigger may fire.
    buffer_start: i64,
    /// Days before the last leadtime at which the search stops.
    buffer_end: i64,
    /// Length of the strictly positive run required from leadtime 0.
    require_initial_positive_days: i64,
    /// Optional minimum drop around the trigger day.
    effect_size: Option<EffectSize>,
}

impl EventConfig {
    /// Creates a configuration with the defaults.
    ///
    /// Defaults: `buffer_start = 10`, `buffer_end = 10`,
    /// `require_initial_positive_days = 10`, no effect-size requirement.
    pub fn new() -> Self {
        Self {
            buffer_start: 10,
            buffer_end: 10,
            require_initial_positive_days: 10,
            effect_size: None,
        }
    }

    pub fn with_buffer_start(mut self, days: i64) -> Self {
        self.buffer_start = days;
        self
    }

    pub fn with_buffer_end(mut self, days: i64) -> Self {
        self.buffer_end = days;
        self
    }

    pub fn with_require_initial_positive_days(mut self, days: i64) -> Self {
        self.require_initial_positive_days = days;
        self
    }

    /// Sets or clears the effect-size requirement.
    pub fn with_effect_size(mut self, effect_size: Option<EffectSize>) -> Self {
        self.effect_size = effect_size;
        self
    }

    pub fn buffer_start(&self) -> i64 {
        self.buffer_start
    }

    pub fn buffer_end(&self) -> i64 {
        self.buffer_end
    }

    pub fn require_initial_positive_days(&self) -> i64 {
        self.require_initial_positive_days
    }

    pub fn effect_size(&self) -> Option<EffectSize> {
        self.effect_size
    }

    /// Validates this configuration.
    ///
    /// All day counts must be non-negative and an effect-size window must be
    /// positive with a finite threshold.
    pub fn validate(&self) -> Result<(), EventError> {
        for (name, days) in [
            ("buffer_start", self.buffer_start),
            ("buffer_end", self.buffer_end),
            (
                "require_initial_positive_days",
                self.require_initial_positive_days,
            ),
        ] {
            if days < 0 {
                return Err(EventError::InvalidConfig {
                    reason: format!("{name} must be >= 0, got {days}"),
                });
            }
        }
        if let Some(effect) = self.effect_size {
            if effect.window <= 0 {
                return Err(EventError::InvalidConfig {
                    reason: format!("effect size window must be > 0, got {}", effect.window),
                });
            }
            if !effect.min_change.is_finite() {
                return Err(EventError::InvalidConfig {
                    reason: "effect size threshold must be finite".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of scanning one forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scan {
    /// No finite value at all.
    Missing,
    /// The initial positive run was not satisfied.
    NotInitiallyPositive,
    /// No negative value inside the search range.
    NoCrossing,
    /// A crossing was found but the drop around it was too small.
    TooWeak,
    Found(i64),
}

/// Finds the first threshold crossing of every forecast in a scalar series.
///
/// Events are returned ordered by reftime, then hindcast year, then member.
/// Forecasts without any data, without the initial positive run, or without
/// a qualifying crossing contribute nothing.
///
/// # Errors
///
/// Returns [`EventError::InvalidConfig`] for an invalid `config` and
/// [`EventError::NotScalar`] if `series` has more than one cell.
#[tracing::instrument(skip_all, fields(n_reftimes = series.reftimes().len()))]
pub fn find_threshold_event(series: &Forecast, config: &EventConfig) -> Result<Vec<Event>, EventError> {
    config.validate()?;
    if series.n_cells() != 1 {
        return Err(EventError::NotScalar {
            n_cells: series.n_cells(),
        });
    }

    let (n_ref, n_hcy, n_num) = (
        series.reftimes().len(),
        series.hc_years().len(),
        series.numbers().len(),
    );
    let scans: Vec<(usize, usize, usize, Scan)> = (0..n_ref * n_hcy * n_num)
        .into_par_iter()
        .map(|flat| {
            let (ri, rest) = (flat / (n_hcy * n_num), flat % (n_hcy * n_num));
            let (hi, ni) = (rest / n_num, rest % n_num);
            let column = series.series(ri, hi, ni).column(0).to_vec();
            (ri, hi, ni, scan(series.leadtimes(), &column, config))
        })
        .collect();

    let n_valid = scans.iter().filter(|s| s.3 != Scan::Missing).count();
    let n_positive = scans
        .iter()
        .filter(|s| !matches!(s.3, Scan::Missing | Scan::NotInitiallyPositive))
        .count();
    let n_crossing = scans
        .iter()
        .filter(|s| matches!(s.3, Scan::TooWeak | Scan::Found(_)))
        .count();

    let events: Vec<Event> = scans
        .into_iter()
        .filter_map(|(ri, hi, ni, scan)| match scan {
            Scan::Found(day) => Some(Event::new(
                series.reftimes()[ri],
                series.hc_years()[hi],
                series.numbers()[ni],
                day,
            )),
            _ => None,
        })
        .collect();

    info!(
        n_forecasts = n_ref * n_hcy * n_num,
        n_valid,
        n_positive,
        n_crossing,
        n_events = events.len(),
        "event detection complete"
    );
    Ok(events)
}

fn scan(leadtimes: &[i64], values: &[f64], config: &EventConfig) -> Scan {
    if !values.iter().any(|v| v.is_finite()) {
        return Scan::Missing;
    }

    let initial = 0..config.require_initial_positive_days;
    let positive_start = leadtimes
        .iter()
        .zip(values)
        .filter(|(l, _)| initial.contains(l))
        .all(|(_, &v)| v > 0.0);
    if !positive_start {
        return Scan::NotInitiallyPositive;
    }

    let Some(&last) = leadtimes.last() else {
        return Scan::Missing;
    };
    let search = config.buffer_start..=last - config.buffer_end;
    let Some(trigger) = leadtimes
        .iter()
        .zip(values)
        .find(|(l, v)| search.contains(l) && **v < 0.0)
        .map(|(&l, _)| l)
    else {
        return Scan::NoCrossing;
    };

    match config.effect_size {
        None => Scan::Found(trigger),
        Some(effect) => {
            let at = |lt: i64| {
                leadtimes
                    .binary_search(&lt)
                    .ok()
                    .map(|i| values[i])
                    .filter(|v| v.is_finite())
            };
            match (at(trigger - effect.window), at(trigger + effect.window)) {
                (Some(before), Some(after)) if before - after > effect.min_change => {
                    Scan::Found(trigger)
                }
                _ => Scan::TooWeak,
            }
        }
    }
}

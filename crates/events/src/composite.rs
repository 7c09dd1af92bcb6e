//! Event-centred composites.
//!
//! Each event's trajectory is re-expressed in lagtime, `leadtime - trigger_day`,
//! so that lag 0 is the trigger day of every member. Trajectories are stacked
//! on the union of all lagtimes and padded with `NaN`.

use std::ops::Range;

use chrono::NaiveDate;
use ndarray::{Array2, Array3, ArrayView2, Axis, s};
use s2s_forecast::{Diagnostic, Forecast};
use s2s_stats::{nan_max, nan_mean, nan_min, nan_quantile, nan_std};
use tracing::info;

use crate::error::EventError;
use crate::event::Event;

/// Percentiles reported by default, as quantiles in `[0, 1]`.
pub const DEFAULT_PERCENTILES: [f64; 6] = [0.02, 0.10, 0.30, 0.70, 0.90, 0.98];

/// Trajectories of many events aligned on their trigger day.
#[derive(Debug, Clone)]
pub struct Composite {
    events: Vec<Event>,
    source_positions: Vec<usize>,
    lagtimes: Vec<i64>,
    values: Array3<f64>,
    missing_reftimes: Vec<NaiveDate>,
}

/// Summary statistics of a composite across its members, each shaped
/// `(lagtime, cell)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeStatistics {
    pub mean: Array2<f64>,
    /// Population standard deviation.
    pub std: Array2<f64>,
    pub min: Array2<f64>,
    pub max: Array2<f64>,
}

impl Composite {
    /// The member events, in stacking order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The member coordinate `i`: `0..n` in stacking order.
    pub fn index(&self) -> Range<usize> {
        0..self.events.len()
    }

    /// Position of each member in the event list the composite was built from.
    pub fn source_positions(&self) -> &[usize] {
        &self.source_positions
    }

    /// Ascending union of the members' lagtimes.
    pub fn lagtimes(&self) -> &[i64] {
        &self.lagtimes
    }

    /// Stacked trajectories, shaped `(member, lagtime, cell)`.
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Distinct reftimes that were referenced by events but absent from the
    /// data, in first-seen order.
    pub fn missing_reftimes(&self) -> &[NaiveDate] {
        &self.missing_reftimes
    }

    /// One [`Diagnostic::MissingReftime`] per entry of [`Self::missing_reftimes`].
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.missing_reftimes
            .iter()
            .map(|&reftime| Diagnostic::MissingReftime { reftime })
            .collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of cells per trajectory.
    pub fn n_cells(&self) -> usize {
        self.values.dim().2
    }

    /// Trajectory of member `i`, shaped `(lagtime, cell)`.
    pub fn member(&self, i: usize) -> ArrayView2<'_, f64> {
        self.values.slice(s![i, .., ..])
    }

    /// Position of `lagtime` on the lagtime axis.
    pub fn lagtime_index(&self, lagtime: i64) -> Option<usize> {
        self.lagtimes.binary_search(&lagtime).ok()
    }

    /// Validtime of every member's trigger day.
    pub fn event_dates(&self) -> Result<Vec<NaiveDate>, EventError> {
        self.events.iter().map(Event::validtime).collect()
    }

    /// Number of members with at least one finite cell at each lagtime.
    pub fn n_events_by_lagtime(&self) -> Vec<usize> {
        (0..self.lagtimes.len())
            .map(|k| {
                self.values
                    .index_axis(Axis(1), k)
                    .outer_iter()
                    .filter(|cells| cells.iter().any(|v| v.is_finite()))
                    .count()
            })
            .collect()
    }

    /// Mean, standard deviation, minimum and maximum across members.
    pub fn statistics(&self) -> CompositeStatistics {
        CompositeStatistics {
            mean: self.reduce_members(nan_mean),
            std: self.reduce_members(nan_std),
            min: self.reduce_members(nan_min),
            max: self.reduce_members(nan_max),
        }
    }

    /// Quantiles across members, shaped `(quantile, lagtime, cell)`.
    ///
    /// Quantiles use linear interpolation between order statistics and skip
    /// missing values.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidConfig`] if a quantile is outside `[0, 1]`.
    pub fn percentiles(&self, quantiles: &[f64]) -> Result<Array3<f64>, EventError> {
        if let Some(q) = quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(EventError::InvalidConfig {
                reason: format!("quantile must be in [0, 1], got {q}"),
            });
        }
        Ok(self.quantiles_across(quantiles))
    }

    /// [`Self::percentiles`] at [`DEFAULT_PERCENTILES`].
    pub fn default_percentiles(&self) -> Array3<f64> {
        self.quantiles_across(&DEFAULT_PERCENTILES)
    }

    fn quantiles_across(&self, quantiles: &[f64]) -> Array3<f64> {
        let (_, n_lag, n_cell) = self.values.dim();
        let mut out = Array3::from_elem((quantiles.len(), n_lag, n_cell), f64::NAN);
        for k in 0..n_lag {
            for c in 0..n_cell {
                let column = self.values.slice(s![.., k, c]).to_vec();
                for (qi, &q) in quantiles.iter().enumerate() {
                    out[[qi, k, c]] = nan_quantile(&column, q);
                }
            }
        }
        out
    }

    /// Sub-composite of the members whose event satisfies `predicate`.
    ///
    /// The lagtime axis is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::NoMatchingEvents`] if no member is selected.
    pub fn select(&self, predicate: impl Fn(&Event) -> bool) -> Result<Composite, EventError> {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| predicate(&self.events[i]))
            .collect();
        if keep.is_empty() {
            return Err(EventError::NoMatchingEvents {
                n_events: self.len(),
            });
        }
        Ok(Composite {
            events: keep.iter().map(|&i| self.events[i]).collect(),
            source_positions: keep.iter().map(|&i| self.source_positions[i]).collect(),
            lagtimes: self.lagtimes.clone(),
            values: self.values.select(Axis(0), &keep),
            missing_reftimes: self.missing_reftimes.clone(),
        })
    }

    fn reduce_members(&self, f: fn(&[f64]) -> f64) -> Array2<f64> {
        let (_, n_lag, n_cell) = self.values.dim();
        Array2::from_shape_fn((n_lag, n_cell), |(k, c)| {
            f(&self.values.slice(s![.., k, c]).to_vec())
        })
    }
}

/// Builds a composite of `data` around each event's trigger day.
///
/// Events whose reftime is absent from `data` are skipped with one warning
/// per distinct reftime.
///
/// # Errors
///
/// Returns [`EventError::UnknownMember`] if an event's reftime is present but
/// its hindcast year or member is not, and [`EventError::NoMatchingEvents`]
/// if nothing is left to stack.
#[tracing::instrument(skip_all, fields(n_events = events.len()))]
pub fn composite(events: &[Event], data: &Forecast) -> Result<Composite, EventError> {
    let mut missing_reftimes: Vec<NaiveDate> = Vec::new();
    let mut members: Vec<(usize, Event, [usize; 3])> = Vec::with_capacity(events.len());

    for (pos, &event) in events.iter().enumerate() {
        let Some(ri) = data.reftime_index(event.reftime()) else {
            if !missing_reftimes.contains(&event.reftime()) {
                missing_reftimes.push(event.reftime());
                Diagnostic::MissingReftime {
                    reftime: event.reftime(),
                }
                .emit();
            }
            continue;
        };
        let unknown = || EventError::UnknownMember {
            reftime: event.reftime(),
            hc_year: event.hc_year(),
            number: event.number(),
        };
        let hi = data.hc_year_index(event.hc_year()).ok_or_else(unknown)?;
        let ni = data.number_index(event.number()).ok_or_else(unknown)?;
        members.push((pos, event, [ri, hi, ni]));
    }

    if members.is_empty() {
        return Err(EventError::NoMatchingEvents {
            n_events: events.len(),
        });
    }

    let leadtimes = data.leadtimes();
    let mut lagtimes: Vec<i64> = members
        .iter()
        .flat_map(|(_, ev, _)| leadtimes.iter().map(move |&l| l - ev.trigger_day()))
        .collect();
    lagtimes.sort_unstable();
    lagtimes.dedup();

    let n_cell = data.n_cells();
    let mut values = Array3::from_elem((members.len(), lagtimes.len(), n_cell), f64::NAN);
    for (m, (_, event, [ri, hi, ni])) in members.iter().enumerate() {
        let series = data.series(*ri, *hi, *ni);
        for (li, &lead) in leadtimes.iter().enumerate() {
            // Every shifted leadtime is on the union axis.
            let Ok(k) = lagtimes.binary_search(&(lead - event.trigger_day())) else {
                continue;
            };
            values
                .slice_mut(s![m, k, ..])
                .assign(&series.slice(s![li, ..]));
        }
    }

    info!(
        n_members = members.len(),
        n_missing_reftimes = missing_reftimes.len(),
        n_lagtimes = lagtimes.len(),
        "composite built"
    );

    Ok(Composite {
        events: members.iter().map(|(_, ev, _)| *ev).collect(),
        source_positions: members.iter().map(|(pos, _, _)| *pos).collect(),
        lagtimes,
        values,
        missing_reftimes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array5;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Value = 100 * member + leadtime, one reftime, two hc_years.
    fn data() -> Forecast {
        let values = Array5::from_shape_fn((1, 2, 3, 6, 1), |(_, h, n, l, _)| {
            100.0 * n as f64 + l as f64 + 1000.0 * h as f64
        });
        Forecast::new(vec![d(2020, 1, 2)], vec![-1, 0], vec![0, 1, 2], (0..6).collect(), values)
            .unwrap()
    }

    #[test]
    fn aligns_on_trigger_day() {
        let events = [
            Event::new(d(2020, 1, 2), -1, 0, 2),
            Event::new(d(2020, 1, 2), 0, 2, 4),
        ];
        let comp = composite(&events, &data()).unwrap();
        assert_eq!(comp.lagtimes(), &(-4..=3).collect::<Vec<_>>()[..]);
        let k0 = comp.lagtime_index(0).unwrap();
        assert_eq!(comp.values()[[0, k0, 0]], 2.0);
        assert_eq!(comp.values()[[1, k0, 0]], 1204.0);
        // Member 0 starts at lag -2.
        assert!(comp.values()[[0, 0, 0]].is_nan());
        assert_eq!(comp.values()[[0, 2, 0]], 0.0);
        assert_eq!(comp.n_events_by_lagtime(), vec![1, 1, 2, 2, 2, 2, 1, 1]);
        assert_eq!(comp.index(), 0..2);
        assert_eq!(comp.source_positions(), &[0, 1]);
    }

    #[test]
    fn skips_missing_reftimes_once() {
        let events = [
            Event::new(d(2019, 1, 2), 0, 0, 1),
            Event::new(d(2020, 1, 2), 0, 1, 1),
            Event::new(d(2019, 1, 2), 0, 1, 1),
        ];
        let comp = composite(&events, &data()).unwrap();
        assert_eq!(comp.len(), 1);
        assert_eq!(comp.index(), 0..1);
        assert_eq!(comp.source_positions(), &[1]);
        assert_eq!(comp.missing_reftimes(), &[d(2019, 1, 2)]);
        assert_eq!(
            comp.diagnostics(),
            vec![Diagnostic::MissingReftime {
                reftime: d(2019, 1, 2)
            }]
        );
    }

    #[test]
    fn unknown_member_is_an_error() {
        let events = [Event::new(d(2020, 1, 2), -5, 0, 1)];
        assert!(matches!(
            composite(&events, &data()),
            Err(EventError::UnknownMember { hc_year: -5, .. })
        ));
    }

    #[test]
    fn nothing_to_stack() {
        let events = [Event::new(d(2019, 1, 2), 0, 0, 1)];
        assert_eq!(
            composite(&events, &data()).unwrap_err(),
            EventError::NoMatchingEvents { n_events: 1 }
        );
        assert!(composite(&[], &data()).is_err());
    }

    #[test]
    fn statistics_across_members() {
        let events = [
            Event::new(d(2020, 1, 2), 0, 0, 0),
            Event::new(d(2020, 1, 2), 0, 1, 0),
            Event::new(d(2020, 1, 2), 0, 2, 0),
        ];
        let comp = composite(&events, &data()).unwrap();
        let stats = comp.statistics();
        // Lag 0 holds 1000, 1100 and 1200.
        assert_relative_eq!(stats.mean[[0, 0]], 1100.0, epsilon = 1e-9);
        assert_relative_eq!(stats.std[[0, 0]], (20000.0_f64 / 3.0).sqrt(), epsilon = 1e-9);
        assert_eq!(stats.min[[0, 0]], 1000.0);
        assert_eq!(stats.max[[0, 0]], 1200.0);

        let pct = comp.percentiles(&[0.0, 0.5, 1.0]).unwrap();
        assert_eq!(pct.dim(), (3, 6, 1));
        assert_relative_eq!(pct[[1, 3, 0]], 1103.0, epsilon = 1e-9);
        assert!(comp.percentiles(&[1.5]).is_err());

        let defaults = comp.default_percentiles();
        assert_eq!(defaults.dim(), (DEFAULT_PERCENTILES.len(), 6, 1));
        // 10 % of [1000, 1100, 1200] at lag 0
        assert_relative_eq!(defaults[[1, 0, 0]], 1020.0, epsilon = 1e-9);
        assert_eq!(defaults, comp.percentiles(&DEFAULT_PERCENTILES).unwrap());
    }

    #[test]
    fn select_members() {
        let events = [
            Event::new(d(2020, 1, 2), -1, 0, 3),
            Event::new(d(2020, 1, 2), 0, 0, 3),
        ];
        let comp = composite(&events, &data()).unwrap();
        let realtime = comp.select(Event::is_realtime).unwrap();
        assert_eq!(realtime.len(), 1);
        assert_eq!(realtime.index(), 0..1);
        assert_eq!(realtime.source_positions(), &[1]);
        assert_eq!(realtime.lagtimes(), comp.lagtimes());
        assert_eq!(realtime.member(0), comp.member(1));
        assert!(comp.select(|ev| ev.number() == 9).is_err());
    }
}

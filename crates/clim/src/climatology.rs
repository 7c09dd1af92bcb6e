//! Hindcast climatologies, one profile per reftime.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{Array1, Array2, Array3, ArrayView2, s};
use rayon::prelude::*;
use s2s_forecast::{Diagnostic, Forecast};
use s2s_stats::{nan_mean, nan_std};
use tracing::{debug, info};

use crate::config::{ClimatologyConfig, Grouping, Statistic};
use crate::error::ClimError;
use crate::profile::{centered_rolling_mean, interp_extrapolate};

/// A climatology: one profile per reftime over the data's leadtimes.
///
/// Values are shaped `(reftime, leadtime, cell)`. The reftime and leadtime
/// axes equal those of the forecast the climatology was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    reftimes: Vec<NaiveDate>,
    leadtimes: Vec<i64>,
    statistic: Statistic,
    values: Array3<f64>,
    diagnostics: Vec<Diagnostic>,
}

impl Climatology {
    /// Reference dates, equal to the input forecast's.
    pub fn reftimes(&self) -> &[NaiveDate] {
        &self.reftimes
    }

    /// Leadtimes in days, equal to the input forecast's.
    pub fn leadtimes(&self) -> &[i64] {
        &self.leadtimes
    }

    /// The aggregated statistic.
    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Values shaped `(reftime, leadtime, cell)`.
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Diagnostics recorded while computing, in reftime order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Profile of reftime index `ri`, shaped `(leadtime, cell)`.
    pub fn profile(&self, ri: usize) -> ArrayView2<'_, f64> {
        self.values.slice(s![ri, .., ..])
    }

    /// Profile of the given reftime, if present.
    pub fn profile_for(&self, reftime: NaiveDate) -> Option<ArrayView2<'_, f64>> {
        self.reftimes
            .binary_search(&reftime)
            .ok()
            .map(|ri| self.profile(ri))
    }
}

/// Per-reftime inputs that do not change across reftimes.
struct Selection<'a> {
    data: &'a Forecast,
    config: &'a ClimatologyConfig,
    /// Reftime indices carrying any finite hindcast value.
    with_hindcast: Vec<usize>,
    /// hc_year indices with `hc_year != 0`.
    hindcast_rows: Vec<usize>,
    /// Member indices entering the statistic.
    members: Vec<usize>,
}

/// Computes a climatology for every reftime of `data`.
///
/// For reftime `r`, the training set is every reftime within
/// `r ± window_size` days (inclusive) that carries hindcast data. Its
/// hindcast samples (`hc_year != 0`) are keyed by leadtime or by valid-day
/// offset, aggregated per key ([`Statistic::Mean`] over all members,
/// [`Statistic::Std`] over the control member, population form), smoothed
/// with a centered running mean and restricted to `0 ..= last leadtime`.
/// Leadtimes the training set does not cover are filled by linear
/// interpolation and extrapolation.
///
/// Sparse data is reported, not fatal: an empty training window gives an
/// all-`NaN` profile with [`Diagnostic::EmptyTrainingWindow`], and filled
/// leadtimes record [`Diagnostic::Extrapolated`].
///
/// # Errors
///
/// Returns [`ClimError::InvalidConfig`] for a bad config, or
/// [`ClimError::MissingControlMember`] for a std climatology of data without
/// member `0`.
#[tracing::instrument(
    skip_all,
    fields(n_reftimes = data.reftimes().len(), statistic = %config.statistic())
)]
pub fn climatology(data: &Forecast, config: &ClimatologyConfig) -> Result<Climatology, ClimError> {
    config.validate()?;

    let members = match config.statistic() {
        Statistic::Mean => (0..data.numbers().len()).collect(),
        Statistic::Std => vec![data.number_index(0).ok_or(ClimError::MissingControlMember)?],
    };
    let n_ref = data.reftimes().len();
    let selection = Selection {
        data,
        config,
        with_hindcast: (0..n_ref).filter(|&ri| data.has_hindcast_data(ri)).collect(),
        hindcast_rows: data
            .hc_years()
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y != 0)
            .map(|(hi, _)| hi)
            .collect(),
        members,
    };
    debug!(
        n_with_hindcast = selection.with_hindcast.len(),
        n_hindcast_years = selection.hindcast_rows.len(),
        "selected training data"
    );

    let profiles: Vec<(Array2<f64>, Vec<Diagnostic>)> = (0..n_ref)
        .into_par_iter()
        .map(|ri| reftime_profile(&selection, ri))
        .collect();

    let mut values = Array3::from_elem(
        (n_ref, data.leadtimes().len(), data.n_cells()),
        f64::NAN,
    );
    let mut diagnostics = Vec::new();
    for (ri, (profile, found)) in profiles.into_iter().enumerate() {
        values.slice_mut(s![ri, .., ..]).assign(&profile);
        for diagnostic in found {
            diagnostic.emit_unless(config.suppress_warnings());
            diagnostics.push(diagnostic);
        }
    }
    info!(
        n_reftimes = n_ref,
        n_diagnostics = diagnostics.len(),
        "climatology computed"
    );

    Ok(Climatology {
        reftimes: data.reftimes().to_vec(),
        leadtimes: data.leadtimes().to_vec(),
        statistic: config.statistic(),
        values,
        diagnostics,
    })
}

fn reftime_profile(sel: &Selection<'_>, ri: usize) -> (Array2<f64>, Vec<Diagnostic>) {
    let data = sel.data;
    let config = sel.config;
    let reftime = data.reftimes()[ri];
    let leadtimes = data.leadtimes();
    let (n_lt, n_cell) = (leadtimes.len(), data.n_cells());

    let window = i64::from(config.window_size());
    let training: Vec<usize> = sel
        .with_hindcast
        .iter()
        .copied()
        .filter(|&ti| (data.reftimes()[ti] - reftime).num_days().abs() <= window)
        .collect();
    if training.is_empty() || n_lt == 0 {
        let diagnostics = if training.is_empty() {
            vec![Diagnostic::EmptyTrainingWindow { reftime }]
        } else {
            Vec::new()
        };
        return (Array2::from_elem((n_lt, n_cell), f64::NAN), diagnostics);
    }
    debug!(%reftime, n_training = training.len(), "training window");

    // Key every (training reftime, leadtime) pair.
    let mut groups: BTreeMap<i64, Vec<(usize, usize)>> = BTreeMap::new();
    for &ti in &training {
        let shift = match config.grouping() {
            Grouping::Leadtime => 0,
            Grouping::ValidDay => (data.reftimes()[ti] - reftime).num_days(),
        };
        for (li, &lt) in leadtimes.iter().enumerate() {
            groups.entry(lt + shift).or_default().push((ti, li));
        }
    }
    let keys: Vec<i64> = groups.keys().copied().collect();

    let raw = data.values();
    let mut aggregated = Array2::from_elem((keys.len(), n_cell), f64::NAN);
    let mut samples = Vec::new();
    for (k, pairs) in groups.values().enumerate() {
        for c in 0..n_cell {
            samples.clear();
            for &(ti, li) in pairs {
                for &hi in &sel.hindcast_rows {
                    for &ni in &sel.members {
                        samples.push(raw[[ti, hi, ni, li, c]]);
                    }
                }
            }
            aggregated[[k, c]] = match config.statistic() {
                Statistic::Mean => nan_mean(&samples),
                Statistic::Std => nan_std(&samples),
            };
        }
    }

    for c in 0..n_cell {
        let column = aggregated.column(c).to_vec();
        let smoothed = centered_rolling_mean(&column, config.smoothing_window());
        aggregated.column_mut(c).assign(&Array1::from(smoothed));
    }

    // A leadtime is covered when its key has any finite cell.
    let n_covered = leadtimes
        .iter()
        .filter(|lt| {
            keys.binary_search(lt)
                .is_ok_and(|k| aggregated.row(k).iter().any(|v| v.is_finite()))
        })
        .count();

    if n_covered == n_lt {
        let profile = Array2::from_shape_fn((n_lt, n_cell), |(li, c)| {
            keys.binary_search(&leadtimes[li])
                .map_or(f64::NAN, |k| aggregated[[k, c]])
        });
        return (profile, Vec::new());
    }

    let last = leadtimes[n_lt - 1];
    let kept: Vec<usize> = (0..keys.len())
        .filter(|&k| (0..=last).contains(&keys[k]))
        .collect();
    let xs: Vec<i64> = kept.iter().map(|&k| keys[k]).collect();
    let mut profile = Array2::from_elem((n_lt, n_cell), f64::NAN);
    for c in 0..n_cell {
        let ys: Vec<f64> = kept.iter().map(|&k| aggregated[[k, c]]).collect();
        let filled = interp_extrapolate(&xs, &ys, leadtimes);
        profile.column_mut(c).assign(&Array1::from(filled));
    }
    let diagnostic = Diagnostic::Extrapolated {
        reftime,
        statistic: config.statistic().name(),
        n_days: n_lt - n_covered,
    };
    (profile, vec![diagnostic])
}

//! Canonical labeled forecast archive.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeDelta};
use ndarray::{Array3, Array5, ArrayView2, s};
use s2s_calendar::add_years;

use crate::error::ForecastError;

/// A forecast archive on the canonical axes
/// `(reftime, hc_year, number, leadtime, cell)`.
///
/// `hc_year = 0` is the real-time forecast, negative values are hindcasts
/// initialised that many calendar years before the reftime. Member `0` is the
/// control forecast. Spatial or vertical dimensions are flattened into the
/// trailing `cell` axis, so a single time series has exactly one cell.
///
/// Missing data is `NaN` and always stays on the grid. Every coordinate axis
/// is unique and strictly ascending, and leadtimes are non-negative days.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    reftimes: Vec<NaiveDate>,
    hc_years: Vec<i32>,
    numbers: Vec<u32>,
    leadtimes: Vec<i64>,
    values: Array5<f64>,
}

fn check_axis<T: PartialOrd>(
    axis: &'static str,
    coords: &[T],
    expected: usize,
) -> Result<(), ForecastError> {
    if coords.len() != expected {
        return Err(ForecastError::ShapeMismatch {
            axis,
            expected,
            got: coords.len(),
        });
    }
    if coords.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ForecastError::UnsortedAxis { axis });
    }
    Ok(())
}

fn sorted_union<T: Ord + Copy>(axes: impl Iterator<Item = T>) -> Vec<T> {
    axes.collect::<BTreeSet<_>>().into_iter().collect()
}

fn positions<T: Ord>(target: &[T], coords: &[T]) -> Vec<usize> {
    // Every coordinate is present in `target` by construction.
    coords
        .iter()
        .map(|c| target.binary_search(c).unwrap_or_else(|i| i))
        .collect()
}

impl Forecast {
    /// Creates a forecast after validating coordinates against the data shape.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if an axis length differs from
    /// the data, [`ForecastError::UnsortedAxis`] if an axis is not strictly
    /// ascending, or [`ForecastError::NegativeLeadtime`].
    pub fn new(
        reftimes: Vec<NaiveDate>,
        hc_years: Vec<i32>,
        numbers: Vec<u32>,
        leadtimes: Vec<i64>,
        values: Array5<f64>,
    ) -> Result<Self, ForecastError> {
        let (nr, nh, nn, nl, _) = values.dim();
        check_axis("reftime", &reftimes, nr)?;
        check_axis("hc_year", &hc_years, nh)?;
        check_axis("number", &numbers, nn)?;
        check_axis("leadtime", &leadtimes, nl)?;
        if let Some(&leadtime) = leadtimes.iter().find(|&&l| l < 0) {
            return Err(ForecastError::NegativeLeadtime { leadtime });
        }
        Ok(Self {
            reftimes,
            hc_years,
            numbers,
            leadtimes,
            values,
        })
    }

    /// Creates a forecast with every value set to `fill`.
    ///
    /// # Errors
    ///
    /// Same as [`Forecast::new`].
    pub fn filled(
        reftimes: Vec<NaiveDate>,
        hc_years: Vec<i32>,
        numbers: Vec<u32>,
        leadtimes: Vec<i64>,
        n_cells: usize,
        fill: f64,
    ) -> Result<Self, ForecastError> {
        let shape = (
            reftimes.len(),
            hc_years.len(),
            numbers.len(),
            leadtimes.len(),
            n_cells,
        );
        Self::new(
            reftimes,
            hc_years,
            numbers,
            leadtimes,
            Array5::from_elem(shape, fill),
        )
    }

    /// Returns a forecast with the same coordinates and new values.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if `values` has a different shape.
    pub fn with_values(&self, values: Array5<f64>) -> Result<Self, ForecastError> {
        let expected = self.values.dim();
        let got = values.dim();
        if got.4 != expected.4 {
            return Err(ForecastError::ShapeMismatch {
                axis: "cell",
                expected: expected.4,
                got: got.4,
            });
        }
        Self::new(
            self.reftimes.clone(),
            self.hc_years.clone(),
            self.numbers.clone(),
            self.leadtimes.clone(),
            values,
        )
    }

    /// Outer-joins forecasts along the reftime, hc_year and number axes.
    ///
    /// Cells not covered by any part are `NaN`. Where parts overlap, later
    /// parts overwrite earlier ones, but only with finite values.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Empty`] for no parts,
    /// [`ForecastError::LeadtimeMismatch`] if leadtime axes differ, or
    /// [`ForecastError::CellMismatch`] if cell counts differ.
    pub fn combine(parts: &[Forecast]) -> Result<Self, ForecastError> {
        let first = parts.first().ok_or(ForecastError::Empty {
            what: "no forecasts to combine",
        })?;
        for part in &parts[1..] {
            if part.leadtimes != first.leadtimes {
                return Err(ForecastError::LeadtimeMismatch);
            }
            if part.n_cells() != first.n_cells() {
                return Err(ForecastError::CellMismatch {
                    expected: first.n_cells(),
                    got: part.n_cells(),
                });
            }
        }

        let reftimes = sorted_union(parts.iter().flat_map(|p| p.reftimes.iter().copied()));
        let hc_years = sorted_union(parts.iter().flat_map(|p| p.hc_years.iter().copied()));
        let numbers = sorted_union(parts.iter().flat_map(|p| p.numbers.iter().copied()));

        let mut values = Array5::from_elem(
            (
                reftimes.len(),
                hc_years.len(),
                numbers.len(),
                first.leadtimes.len(),
                first.n_cells(),
            ),
            f64::NAN,
        );
        for part in parts {
            let ri = positions(&reftimes, &part.reftimes);
            let hi = positions(&hc_years, &part.hc_years);
            let ni = positions(&numbers, &part.numbers);
            for ((r, h, n, l, c), &v) in part.values.indexed_iter() {
                if v.is_finite() {
                    values[[ri[r], hi[h], ni[n], l, c]] = v;
                }
            }
        }

        Self::new(reftimes, hc_years, numbers, first.leadtimes.clone(), values)
    }

    /// Extracts a single cell as a one-cell forecast.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::IndexOutOfBounds`] if `cell` is out of range.
    pub fn select_cell(&self, cell: usize) -> Result<Self, ForecastError> {
        if cell >= self.n_cells() {
            return Err(ForecastError::IndexOutOfBounds {
                axis: "cell",
                index: cell,
                len: self.n_cells(),
            });
        }
        self.with_values(self.values.slice(s![.., .., .., .., cell..cell + 1]).to_owned())
    }

    /// Calendar date at which the given forecast step is valid:
    /// `add_years(reftime, hc_year) + leadtime`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::IndexOutOfBounds`] for bad indices, or
    /// [`ForecastError::ValidtimeOutOfRange`] if the date is unrepresentable.
    pub fn validtime(&self, ri: usize, hi: usize, li: usize) -> Result<NaiveDate, ForecastError> {
        let bound = |axis, index, len| {
            if index < len {
                Ok(())
            } else {
                Err(ForecastError::IndexOutOfBounds { axis, index, len })
            }
        };
        bound("reftime", ri, self.reftimes.len())?;
        bound("hc_year", hi, self.hc_years.len())?;
        bound("leadtime", li, self.leadtimes.len())?;

        let (reftime, hc_year, leadtime) = (self.reftimes[ri], self.hc_years[hi], self.leadtimes[li]);
        let start = add_years(reftime, hc_year)?;
        TimeDelta::try_days(leadtime)
            .and_then(|d| start.checked_add_signed(d))
            .ok_or(ForecastError::ValidtimeOutOfRange {
                reftime,
                hc_year,
                leadtime,
            })
    }

    /// Validtimes of the whole archive, shaped `(reftime, hc_year, leadtime)`.
    ///
    /// # Errors
    ///
    /// Same as [`Forecast::validtime`].
    pub fn validtimes(&self) -> Result<Array3<NaiveDate>, ForecastError> {
        let shape = (self.reftimes.len(), self.hc_years.len(), self.leadtimes.len());
        let mut dates = Vec::with_capacity(shape.0 * shape.1 * shape.2);
        for ri in 0..shape.0 {
            for hi in 0..shape.1 {
                for li in 0..shape.2 {
                    dates.push(self.validtime(ri, hi, li)?);
                }
            }
        }
        Array3::from_shape_vec(shape, dates).map_err(|_| ForecastError::ShapeMismatch {
            axis: "validtime",
            expected: shape.0 * shape.1 * shape.2,
            got: 0,
        })
    }

    /// `true` if reftime `ri` has any finite value at a hindcast year (`hc_year != 0`).
    pub fn has_hindcast_data(&self, ri: usize) -> bool {
        self.hc_years
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y != 0)
            .any(|(hi, _)| {
                self.values
                    .slice(s![ri, hi, .., .., ..])
                    .iter()
                    .any(|v| v.is_finite())
            })
    }

    /// One ensemble member's trajectory, shaped `(leadtime, cell)`.
    pub fn series(&self, ri: usize, hi: usize, ni: usize) -> ArrayView2<'_, f64> {
        self.values.slice(s![ri, hi, ni, .., ..])
    }

    /// Position of `reftime` on the reftime axis.
    pub fn reftime_index(&self, reftime: NaiveDate) -> Option<usize> {
        self.reftimes.binary_search(&reftime).ok()
    }

    /// Position of `hc_year` on the hc_year axis.
    pub fn hc_year_index(&self, hc_year: i32) -> Option<usize> {
        self.hc_years.binary_search(&hc_year).ok()
    }

    /// Position of member `number` on the number axis.
    pub fn number_index(&self, number: u32) -> Option<usize> {
        self.numbers.binary_search(&number).ok()
    }

    /// Reference dates.
    pub fn reftimes(&self) -> &[NaiveDate] {
        &self.reftimes
    }

    /// Hindcast year offsets.
    pub fn hc_years(&self) -> &[i32] {
        &self.hc_years
    }

    /// Ensemble member numbers.
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    /// Leadtimes in days.
    pub fn leadtimes(&self) -> &[i64] {
        &self.leadtimes
    }

    /// The data array.
    pub fn values(&self) -> &Array5<f64> {
        &self.values
    }

    /// Number of cells per time step.
    pub fn n_cells(&self) -> usize {
        self.values.dim().4
    }

    /// Consumes self and returns the data array.
    pub fn into_values(self) -> Array5<f64> {
        self.values
    }
}

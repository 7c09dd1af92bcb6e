//! Forecasts as they come out of a single archive file.

use chrono::NaiveDate;
use ndarray::{Array2, Array3, Axis};

use crate::error::ForecastError;

/// A forecast on a flat `time` axis, before re-indexing.
///
/// Values are shaped `(number, time, cell)`. A real-time file holds one
/// forecast; a hindcast file holds the same forecast initialised in several
/// past years, concatenated along `time` with multi-day gaps in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    time: Vec<NaiveDate>,
    numbers: Vec<u32>,
    values: Array3<f64>,
    source: Option<String>,
}

impl RawForecast {
    /// Creates a raw forecast without a member axis, shaped `(time, cell)`.
    ///
    /// The result carries a single member `number = 0`.
    ///
    /// # Errors
    ///
    /// Same as [`RawForecast::with_members`].
    pub fn new(time: Vec<NaiveDate>, values: Array2<f64>) -> Result<Self, ForecastError> {
        Self::with_members(time, vec![0], values.insert_axis(Axis(0)))
    }

    /// Creates a raw forecast with an explicit member axis, shaped
    /// `(number, time, cell)`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Empty`] if there are no time steps,
    /// [`ForecastError::ShapeMismatch`] if an axis does not match the data, or
    /// [`ForecastError::UnsortedAxis`] if `time` or `numbers` is not strictly
    /// ascending.
    pub fn with_members(
        time: Vec<NaiveDate>,
        numbers: Vec<u32>,
        values: Array3<f64>,
    ) -> Result<Self, ForecastError> {
        if time.is_empty() {
            return Err(ForecastError::Empty {
                what: "raw forecast has no time steps",
            });
        }
        let (nn, nt, _) = values.dim();
        if numbers.len() != nn {
            return Err(ForecastError::ShapeMismatch {
                axis: "number",
                expected: nn,
                got: numbers.len(),
            });
        }
        if time.len() != nt {
            return Err(ForecastError::ShapeMismatch {
                axis: "time",
                expected: nt,
                got: time.len(),
            });
        }
        if numbers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::UnsortedAxis { axis: "number" });
        }
        if time.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::UnsortedAxis { axis: "time" });
        }
        Ok(Self {
            time,
            numbers,
            values,
            source: None,
        })
    }

    /// Attaches the file name the forecast was read from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The flat time axis.
    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    /// Ensemble member numbers.
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    /// Data shaped `(number, time, cell)`.
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Source file name, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Number of cells per time step.
    pub fn n_cells(&self) -> usize {
        self.values.dim().2
    }
}

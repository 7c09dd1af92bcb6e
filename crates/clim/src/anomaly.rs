//! Anomalies relative to a hindcast climatology.

use ndarray::Array5;
use s2s_forecast::{Diagnostic, Forecast};

use crate::climatology::{Climatology, climatology};
use crate::config::{AnomalyConfig, Statistic};
use crate::error::ClimError;

/// Anomalies together with the climatologies they were computed from.
#[derive(Debug, Clone)]
pub struct Anomaly {
    values: Forecast,
    mean: Climatology,
    std: Option<Climatology>,
    diagnostics: Vec<Diagnostic>,
}

impl Anomaly {
    /// Anomalies on the input forecast's axes.
    pub fn values(&self) -> &Forecast {
        &self.values
    }

    /// The mean climatology.
    pub fn mean(&self) -> &Climatology {
        &self.mean
    }

    /// The standard deviation climatology, if standardized.
    pub fn std(&self) -> Option<&Climatology> {
        self.std.as_ref()
    }

    /// Diagnostics of both climatologies.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes self and returns the anomalies.
    pub fn into_values(self) -> Forecast {
        self.values
    }

    pub(crate) fn map_values(self, f: impl Fn(f64) -> f64) -> Result<Self, ClimError> {
        let mapped = self.values.values().mapv(f);
        Ok(Self {
            values: self.values.with_values(mapped)?,
            ..self
        })
    }
}

/// Subtracts the mean climatology from every member and hindcast year.
///
/// With `standardize`, the result is further divided by the standard
/// deviation climatology of the control member. A zero standard deviation
/// yields infinite or `NaN` anomalies.
///
/// # Errors
///
/// Propagates the errors of [`climatology`].
#[tracing::instrument(skip_all, fields(standardize = config.standardize()))]
pub fn anomaly(data: &Forecast, config: &AnomalyConfig) -> Result<Anomaly, ClimError> {
    config.validate()?;

    let base = config.climatology().clone();
    let mean = climatology(data, &base.clone().with_statistic(Statistic::Mean))?;
    let std = if config.standardize() {
        Some(climatology(data, &base.with_statistic(Statistic::Std))?)
    } else {
        None
    };

    let raw = data.values();
    let m = mean.values();
    let values = match &std {
        Some(sd) => {
            let s = sd.values();
            Array5::from_shape_fn(raw.dim(), |(r, h, n, l, c)| {
                (raw[[r, h, n, l, c]] - m[[r, l, c]]) / s[[r, l, c]]
            })
        }
        None => Array5::from_shape_fn(raw.dim(), |(r, h, n, l, c)| {
            raw[[r, h, n, l, c]] - m[[r, l, c]]
        }),
    };

    let diagnostics = mean
        .diagnostics()
        .iter()
        .chain(std.iter().flat_map(|sd| sd.diagnostics()))
        .cloned()
        .collect();

    Ok(Anomaly {
        values: data.with_values(values)?,
        mean,
        std,
        diagnostics,
    })
}

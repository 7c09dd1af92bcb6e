//! Polar-cap averages and the Northern Annular Mode index.

use ndarray::Array5;
use s2s_forecast::Forecast;

use crate::anomaly::{Anomaly, anomaly};
use crate::config::{AnomalyConfig, ClimatologyConfig};
use crate::error::ClimError;

/// Equatorward edge of the polar cap used for the NAM index, in degrees.
pub const NAM_CAP_LATITUDE: f64 = 65.0;

/// Area-weighted mean over cells at or poleward of `min_latitude`.
///
/// `latitudes` gives the latitude of each cell. Weights are `cos(latitude)`;
/// missing values are skipped and the weights renormalized.
///
/// # Errors
///
/// Returns [`ClimError::LatitudeMismatch`] if `latitudes` does not match the
/// cell axis, or [`ClimError::EmptyPolarCap`] if no cell is inside the cap.
pub fn polar_cap_mean(
    data: &Forecast,
    latitudes: &[f64],
    min_latitude: f64,
) -> Result<Forecast, ClimError> {
    if latitudes.len() != data.n_cells() {
        return Err(ClimError::LatitudeMismatch {
            expected: data.n_cells(),
            got: latitudes.len(),
        });
    }
    let cap: Vec<(usize, f64)> = latitudes
        .iter()
        .enumerate()
        .filter(|&(_, &lat)| lat >= min_latitude)
        .map(|(c, &lat)| (c, lat.to_radians().cos()))
        .collect();
    if cap.is_empty() {
        return Err(ClimError::EmptyPolarCap { min_latitude });
    }

    let raw = data.values();
    let (nr, nh, nn, nl, _) = raw.dim();
    let values = Array5::from_shape_fn((nr, nh, nn, nl, 1), |(r, h, n, l, _)| {
        let (sum, weight) = cap.iter().fold((0.0, 0.0), |(s, w), &(c, wt)| {
            let v = raw[[r, h, n, l, c]];
            if v.is_finite() { (s + wt * v, w + wt) } else { (s, w) }
        });
        if weight > 0.0 { sum / weight } else { f64::NAN }
    });
    Ok(data.with_values(values)?)
}

/// Northern Annular Mode index: the negative standardized anomaly of polar
/// cap geopotential height (cap edge [`NAM_CAP_LATITUDE`]).
///
/// # Errors
///
/// Propagates the errors of [`polar_cap_mean`] and [`anomaly`].
pub fn nam_index(
    geopotential: &Forecast,
    latitudes: &[f64],
    config: &ClimatologyConfig,
) -> Result<Anomaly, ClimError> {
    let cap = polar_cap_mean(geopotential, latitudes, NAM_CAP_LATITUDE)?;
    let anomaly_config = AnomalyConfig::new()
        .with_climatology(config.clone())
        .with_standardize(true);
    anomaly(&cap, &anomaly_config)?.map_values(|v| -v)
}

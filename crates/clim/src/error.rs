//! Error types for the s2s-clim crate.

use s2s_forecast::ForecastError;

/// Error type for all fallible operations in the s2s-clim crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClimError {
    /// Returned when a configuration value is invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a statistic name is not recognised.
    #[error("unknown statistic '{name}', expected 'mean' or 'std'")]
    UnknownStatistic {
        /// The offending name.
        name: String,
    },

    /// Returned when a grouping name is not recognised.
    #[error("unsupported grouping '{name}', expected 'leadtime' or 'validday'")]
    UnsupportedGrouping {
        /// The offending name.
        name: String,
    },

    /// Returned when a standard deviation climatology is requested but the
    /// data has no control member (`number = 0`).
    #[error("std climatology requires the control member (number 0)")]
    MissingControlMember,

    /// Returned when the latitude list does not match the cell axis.
    #[error("{got} latitudes given for {expected} cells")]
    LatitudeMismatch {
        /// Number of cells in the data.
        expected: usize,
        /// Number of latitudes provided.
        got: usize,
    },

    /// Returned when no cell lies inside the polar cap.
    #[error("no cell at or poleward of {min_latitude} degrees")]
    EmptyPolarCap {
        /// Equatorward edge of the cap.
        min_latitude: f64,
    },

    /// Wraps an error from the s2s-forecast crate.
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

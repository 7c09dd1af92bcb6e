//! Error types for the s2s-forecast crate.

use chrono::NaiveDate;
use s2s_calendar::CalendarError;

/// Error type for all fallible operations in the s2s-forecast crate.
///
/// Covers shape and coordinate invariants of [`crate::Forecast`], structural
/// problems found while re-indexing a raw forecast, and calendar failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    /// Returned when a coordinate axis does not match the data shape.
    #[error("axis '{axis}' has {got} coordinates but the data has {expected}")]
    ShapeMismatch {
        /// Name of the axis.
        axis: &'static str,
        /// Length of the data along this axis.
        expected: usize,
        /// Number of coordinates provided.
        got: usize,
    },

    /// Returned when coordinates are not unique and strictly ascending.
    #[error("coordinates of axis '{axis}' must be unique and sorted ascending")]
    UnsortedAxis {
        /// Name of the axis.
        axis: &'static str,
    },

    /// Returned when a leadtime is negative.
    #[error("leadtime must be non-negative, got {leadtime} days")]
    NegativeLeadtime {
        /// The offending leadtime in days.
        leadtime: i64,
    },

    /// Returned when an input has nothing to work with.
    #[error("empty input: {what}")]
    Empty {
        /// Description of what was empty.
        what: &'static str,
    },

    /// Returned when a hindcast time axis cannot be split into equal segments.
    #[error(
        "hindcast of {total} time steps cannot be split into segments of {segment} steps"
    )]
    SegmentLengthMismatch {
        /// Total number of time steps.
        total: usize,
        /// Length of the first segment.
        segment: usize,
    },

    /// Returned when forecasts with different leadtime axes are combined.
    #[error("cannot combine forecasts with different leadtime axes")]
    LeadtimeMismatch,

    /// Returned when forecasts with different cell counts are combined.
    #[error("cell count mismatch: expected {expected}, got {got}")]
    CellMismatch {
        /// Cell count of the first forecast.
        expected: usize,
        /// Cell count of the offending forecast.
        got: usize,
    },

    /// Returned when an index is outside an axis.
    #[error("index {index} out of bounds for axis '{axis}' of length {len}")]
    IndexOutOfBounds {
        /// Name of the axis.
        axis: &'static str,
        /// Requested index.
        index: usize,
        /// Axis length.
        len: usize,
    },

    /// Returned when a validtime falls outside the representable date range.
    #[error("validtime of {reftime} (hc_year {hc_year}) + {leadtime} days is out of range")]
    ValidtimeOutOfRange {
        /// Reference date of the forecast.
        reftime: NaiveDate,
        /// Hindcast year offset.
        hc_year: i32,
        /// Leadtime in days.
        leadtime: i64,
    },

    /// Returned when a configuration value is invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps an error from the s2s-calendar crate.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_shape_mismatch() {
        let err = ForecastError::ShapeMismatch {
            axis: "leadtime",
            expected: 47,
            got: 46,
        };
        assert_eq!(
            err.to_string(),
            "axis 'leadtime' has 46 coordinates but the data has 47"
        );
    }

    #[test]
    fn error_unsorted_axis() {
        let err = ForecastError::UnsortedAxis { axis: "hc_year" };
        assert_eq!(
            err.to_string(),
            "coordinates of axis 'hc_year' must be unique and sorted ascending"
        );
    }

    #[test]
    fn error_segment_length_mismatch() {
        let err = ForecastError::SegmentLengthMismatch {
            total: 941,
            segment: 47,
        };
        assert_eq!(
            err.to_string(),
            "hindcast of 941 time steps cannot be split into segments of 47 steps"
        );
    }

    #[test]
    fn error_validtime_out_of_range() {
        let err = ForecastError::ValidtimeOutOfRange {
            reftime: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            hc_year: -1,
            leadtime: 5,
        };
        assert_eq!(
            err.to_string(),
            "validtime of 2020-01-02 (hc_year -1) + 5 days is out of range"
        );
    }

    #[test]
    fn error_calendar_is_transparent() {
        let inner = CalendarError::LengthMismatch { dates: 2, years: 3 };
        let err = ForecastError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<ForecastError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ForecastError>();
    }
}

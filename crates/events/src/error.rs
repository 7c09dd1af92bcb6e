//! Error types for the s2s-events crate.

use std::path::PathBuf;

use chrono::NaiveDate;
use s2s_calendar::CalendarError;
use s2s_forecast::ForecastError;

/// Error type for event detection, compositing and event-list exchange.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    /// Returned when an operation needs a single-cell forecast.
    #[error("expected a scalar series with 1 cell, got {n_cells} cells")]
    NotScalar {
        /// Number of cells in the input.
        n_cells: usize,
    },

    /// Returned when an event names a hindcast year or member absent from the data.
    #[error("event ({reftime}, hc_year {hc_year}, number {number}) has no matching forecast")]
    UnknownMember {
        /// Reftime of the event.
        reftime: NaiveDate,
        /// Hindcast year offset of the event.
        hc_year: i32,
        /// Ensemble member of the event.
        number: u32,
    },

    /// Returned when none of the events matched the data.
    #[error("none of {n_events} event(s) matched the data")]
    NoMatchingEvents {
        /// Number of events supplied.
        n_events: usize,
    },

    /// Returned when an event's validtime cannot be represented.
    #[error("validtime of event ({reftime}, hc_year {hc_year}) + {trigger_day} days is out of range")]
    ValidtimeOutOfRange {
        /// Reftime of the event.
        reftime: NaiveDate,
        /// Hindcast year offset of the event.
        hc_year: i32,
        /// Trigger day in days since initialization.
        trigger_day: i64,
    },

    /// Returned when an event record cannot be decoded.
    #[error("malformed event record {index}: {reason}")]
    MalformedEvent {
        /// Position of the record in its list.
        index: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a configuration value is invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the population for resampling is empty.
    #[error("empty population: no forecast has data")]
    EmptyPopulation,

    /// Returned when an event list file cannot be read or written.
    #[error("I/O error on '{}': {reason}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error message.
        reason: String,
    },

    /// Returned when an event list is not valid JSON.
    #[error("invalid event list JSON: {reason}")]
    Json {
        /// Underlying error message.
        reason: String,
    },

    /// Wraps an error from the s2s-forecast crate.
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Wraps an error from the s2s-calendar crate.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            reason: err.to_string(),
        }
    }
}

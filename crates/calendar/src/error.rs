//! Error types for the s2s-calendar crate.

/// Error type for all fallible operations in the s2s-calendar crate.
///
/// Covers unrepresentable dates, mismatched elementwise inputs and
/// malformed ISO-8601 duration strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when shifting a date leaves the representable calendar range.
    #[error("cannot shift {date} by {years} years: out of range")]
    OutOfRange {
        /// The date that was shifted.
        date: chrono::NaiveDate,
        /// The requested shift in years.
        years: i32,
    },

    /// Returned when elementwise inputs have different lengths.
    #[error("length mismatch: {dates} dates but {years} year offsets")]
    LengthMismatch {
        /// Number of dates provided.
        dates: usize,
        /// Number of year offsets provided.
        years: usize,
    },

    /// Returned when a duration string cannot be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration {
        /// The offending input string.
        input: String,
        /// Description of the problem.
        reason: &'static str,
    },

    /// Returned when a day count does not fit in a `TimeDelta`.
    #[error("duration of {days} days is out of range")]
    DurationOutOfRange {
        /// The requested number of days.
        days: i64,
    },

    /// Returned when a duration is not a whole number of days.
    #[error("duration of {seconds} s is not a whole number of days")]
    NotWholeDays {
        /// The total duration in seconds.
        seconds: i64,
    },
}

//! Day-resolution durations and their ISO-8601 text form.

use chrono::TimeDelta;

use crate::error::CalendarError;

const SECONDS_PER_DAY: i64 = 86_400;

/// A duration given either as a plain number of days or as a [`TimeDelta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationInput {
    /// Whole days.
    Days(i64),
    /// An arbitrary-resolution time delta.
    Delta(TimeDelta),
}

impl From<i64> for DurationInput {
    fn from(days: i64) -> Self {
        Self::Days(days)
    }
}

impl From<i32> for DurationInput {
    fn from(days: i32) -> Self {
        Self::Days(i64::from(days))
    }
}

impl From<u32> for DurationInput {
    fn from(days: u32) -> Self {
        Self::Days(i64::from(days))
    }
}

impl From<TimeDelta> for DurationInput {
    fn from(delta: TimeDelta) -> Self {
        Self::Delta(delta)
    }
}

/// Normalizes a number of days or a [`TimeDelta`] to a whole-day [`TimeDelta`].
///
/// Sub-day parts of a `TimeDelta` are truncated toward zero.
///
/// # Errors
///
/// Returns [`CalendarError::DurationOutOfRange`] if a plain day count exceeds
/// the range of [`TimeDelta`] (about 10^14 days).
pub fn to_duration(value: impl Into<DurationInput>) -> Result<TimeDelta, CalendarError> {
    let days = match value.into() {
        DurationInput::Days(days) => days,
        DurationInput::Delta(delta) => delta.num_days(),
    };
    TimeDelta::try_days(days).ok_or(CalendarError::DurationOutOfRange { days })
}

/// Formats a whole number of days as an ISO 8601 duration with zeroed time
/// fields, e.g. `P5DT0H0M0S` or `-P3DT0H0M0S`.
pub fn format_iso_duration(days: i64) -> String {
    if days < 0 {
        format!("-P{}DT0H0M0S", days.unsigned_abs())
    } else {
        format!("P{days}DT0H0M0S")
    }
}

/// Parses an ISO-8601 duration into whole days.
///
/// Accepts week, day, hour, minute and second components (`P1W`, `P5D`,
/// `P5DT0H0M0S`, `PT120H`) with an optional leading sign. Calendar years
/// and months are rejected because they have no fixed length.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDuration`] for malformed input and
/// [`CalendarError::NotWholeDays`] if the duration has a sub-day remainder.
pub fn parse_iso_duration(input: &str) -> Result<i64, CalendarError> {
    let invalid = |reason| CalendarError::InvalidDuration {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let body = unsigned
        .strip_prefix('P')
        .ok_or_else(|| invalid("missing 'P' designator"))?;

    let mut seconds = 0.0_f64;
    let mut in_time = false;
    let mut number = String::new();
    let mut n_components = 0;

    for c in body.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            _ => {
                if number.is_empty() {
                    return Err(invalid("designator without a value"));
                }
                let value: f64 = number.parse().map_err(|_| invalid("malformed number"))?;
                number.clear();
                let unit = match (in_time, c) {
                    (false, 'W') => 7.0 * SECONDS_PER_DAY as f64,
                    (false, 'D') => SECONDS_PER_DAY as f64,
                    (true, 'H') => 3_600.0,
                    (true, 'M') => 60.0,
                    (true, 'S') => 1.0,
                    (false, 'Y' | 'M') => {
                        return Err(invalid("years and months have no fixed length"));
                    }
                    _ => return Err(invalid("unknown designator")),
                };
                seconds += value * unit;
                n_components += 1;
            }
        }
    }

    if !number.is_empty() {
        return Err(invalid("trailing value without designator"));
    }
    if n_components == 0 {
        return Err(invalid("no duration components"));
    }

    let total = seconds.round() as i64;
    if (seconds - total as f64).abs() > 1e-6 || total % SECONDS_PER_DAY != 0 {
        return Err(CalendarError::NotWholeDays {
            seconds: if negative { -total } else { total },
        });
    }
    let days = total / SECONDS_PER_DAY;
    Ok(if negative { -days } else { days })
}

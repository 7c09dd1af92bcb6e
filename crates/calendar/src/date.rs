//! Year shifting on the proleptic Gregorian calendar.

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// Returns `true` if `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Shifts `date` by `years` calendar years.
///
/// February 29 shifted into a non-leap year becomes February 28 of that
/// year. It never rolls over into March.
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`] if the target year cannot be
/// represented by [`NaiveDate`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use s2s_calendar::add_years;
///
/// let leap_day = NaiveDate::from_ymd_opt(2016, 2, 29).unwrap();
/// let shifted = add_years(leap_day, 1).unwrap();
/// assert_eq!(shifted, NaiveDate::from_ymd_opt(2017, 2, 28).unwrap());
/// ```
pub fn add_years(date: NaiveDate, years: i32) -> Result<NaiveDate, CalendarError> {
    let out_of_range = || CalendarError::OutOfRange { date, years };
    let target_year = date.year().checked_add(years).ok_or_else(out_of_range)?;

    let day = if date.month() == 2 && date.day() == 29 && !is_leap_year(target_year) {
        28
    } else {
        date.day()
    };
    NaiveDate::from_ymd_opt(target_year, date.month(), day).ok_or_else(out_of_range)
}

/// Shifts each date by its paired year offset.
///
/// A single offset is broadcast over all dates. Otherwise `dates` and
/// `years` are paired elementwise and must have the same length.
///
/// # Errors
///
/// Returns [`CalendarError::LengthMismatch`] if the lengths differ (and
/// `years` is not a single offset), or [`CalendarError::OutOfRange`] if any
/// shifted date is unrepresentable.
pub fn add_years_each(dates: &[NaiveDate], years: &[i32]) -> Result<Vec<NaiveDate>, CalendarError> {
    match years {
        [single] => dates.iter().map(|&d| add_years(d, *single)).collect(),
        _ if years.len() == dates.len() => dates
            .iter()
            .zip(years)
            .map(|(&d, &y)| add_years(d, y))
            .collect(),
        _ => Err(CalendarError::LengthMismatch {
            dates: dates.len(),
            years: years.len(),
        }),
    }
}

//! Winter season labels.

use chrono::{Datelike, NaiveDate};

/// Returns the first calendar year of the July-to-June winter season that
/// contains `date`.
///
/// July through December belong to the season starting that year; January
/// through June belong to the season that started the previous year.
pub fn winter_start_year(date: NaiveDate) -> i32 {
    if date.month() <= 6 {
        date.year() - 1
    } else {
        date.year()
    }
}

/// Labels the winter season containing `date`, e.g. `"2016/17"`.
pub fn winter_season(date: NaiveDate) -> String {
    let start = winter_start_year(date);
    format!("{start}/{:02}", (start + 1).rem_euclid(100))
}

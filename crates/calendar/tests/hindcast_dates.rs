use chrono::{Datelike, NaiveDate};
use s2s_calendar::{add_years, add_years_each, is_leap_year, winter_season};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn twenty_year_hindcast_from_leap_day() {
    // A real-time forecast issued on a leap day with the usual 20 hindcast years.
    let reftime = ymd(2016, 2, 29);
    let offsets: Vec<i32> = (-20..0).collect();
    let starts = add_years_each(&[reftime; 20], &offsets).unwrap();

    for (start, &offset) in starts.iter().zip(&offsets) {
        assert_eq!(start.year(), 2016 + offset);
        assert_eq!(start.month(), 2);
        let expected_day = if is_leap_year(start.year()) { 29 } else { 28 };
        assert_eq!(start.day(), expected_day, "offset {offset}");
    }
}

#[test]
fn every_day_of_year_stays_in_month() {
    let mut date = ymd(2020, 1, 1);
    while date.year() == 2020 {
        for years in [-21, -5, -1, 1, 3] {
            let shifted = add_years(date, years).unwrap();
            assert_eq!(shifted.month(), date.month(), "{date} + {years}");
            assert_eq!(shifted.year(), date.year() + years);
        }
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn hindcast_seasons_follow_start_dates() {
    let reftime = ymd(2017, 1, 2);
    let starts = add_years_each(&[reftime], &[-1]).unwrap();
    assert_eq!(winter_season(reftime), "2016/17");
    assert_eq!(winter_season(starts[0]), "2015/16");
}

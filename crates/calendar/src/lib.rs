//! # s2s-calendar
//!
//! Calendar arithmetic shared by the forecast, climatology and event crates.
//!
//! Hindcasts are labelled relative to the real-time forecast they belong to:
//! a hindcast with `hc_year = -3` was initialised three calendar years before
//! its reference date. Shifting dates by whole years must therefore be
//! leap-day safe, and leadtimes are kept at day resolution throughout.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use s2s_calendar::{add_years, format_iso_duration, parse_iso_duration, winter_season};
//!
//! let reftime = NaiveDate::from_ymd_opt(2016, 2, 29).unwrap();
//! let hindcast_start = add_years(reftime, -1).unwrap();
//! assert_eq!(hindcast_start, NaiveDate::from_ymd_opt(2015, 2, 28).unwrap());
//!
//! assert_eq!(format_iso_duration(5), "P5DT0H0M0S");
//! assert_eq!(parse_iso_duration("P5DT0H0M0S").unwrap(), 5);
//! assert_eq!(winter_season(reftime), "2015/16");
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `date` | Leap-day safe year shifting |
//! | `duration` | Day-resolution durations, ISO-8601 text form |
//! | `season` | July-to-June winter season labels |
//! | `error` | Error types |

mod date;
mod duration;
mod error;
mod season;

pub use date::{add_years, add_years_each, is_leap_year};
pub use duration::{DurationInput, format_iso_duration, parse_iso_duration, to_duration};
pub use error::CalendarError;
pub use season::{winter_season, winter_start_year};

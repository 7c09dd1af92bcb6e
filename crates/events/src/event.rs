//! Detected events and the calendar date they fire on.

use chrono::{NaiveDate, TimeDelta};
use s2s_calendar::add_years;

use crate::error::EventError;

/// A single detected event: one forecast and the day its trigger fired.
///
/// The trigger day is counted in days since initialization of that forecast,
/// so `trigger_day` and the forecast's leadtime share the same scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Event {
    reftime: NaiveDate,
    hc_year: i32,
    number: u32,
    trigger_day: i64,
}

impl Event {
    /// Creates an event.
    pub fn new(reftime: NaiveDate, hc_year: i32, number: u32, trigger_day: i64) -> Self {
        Self {
            reftime,
            hc_year,
            number,
            trigger_day,
        }
    }

    pub fn reftime(&self) -> NaiveDate {
        self.reftime
    }

    pub fn hc_year(&self) -> i32 {
        self.hc_year
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Days since initialization at which the event fired.
    pub fn trigger_day(&self) -> i64 {
        self.trigger_day
    }

    /// `true` for events found in a real-time forecast.
    pub fn is_realtime(&self) -> bool {
        self.hc_year == 0
    }

    /// Calendar date of the event: the shifted reftime plus the trigger day.
    pub fn validtime(&self) -> Result<NaiveDate, EventError> {
        let init = add_years(self.reftime, self.hc_year)?;
        TimeDelta::try_days(self.trigger_day)
            .and_then(|d| init.checked_add_signed(d))
            .ok_or(EventError::ValidtimeOutOfRange {
                reftime: self.reftime,
                hc_year: self.hc_year,
                trigger_day: self.trigger_day,
            })
    }
}

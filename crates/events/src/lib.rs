//! # s2s-events
//!
//! Threshold-crossing events in ensemble forecasts and composites around them.
//!
//! [`find_threshold_event`] scans every member of a scalar series for the
//! first crossing below zero after an initial positive run. [`composite`]
//! stacks any other variable around the detected trigger days, and the
//! `extreme` functions estimate how often a composite turns extreme
//! afterwards. Event lists are exchanged as JSON through the `exchange`
//! functions.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | [`Event`] identity and validtime |
//! | `detect` | [`find_threshold_event`] and [`EventConfig`] |
//! | `composite` | [`Composite`] on the lagtime axis, statistics and percentiles |
//! | `extreme` | Extreme fractions, integrated and bootstrapped probabilities |
//! | `exchange` | JSON event lists, per-reftime splitting, key renaming |
//! | `error` | Error types |
//!
//! ## Quick start
//!
//! ```
//! use chrono::NaiveDate;
//! use ndarray::Array5;
//! use s2s_events::{EventConfig, composite, find_threshold_event};
//! use s2s_forecast::Forecast;
//!
//! // One realtime forecast whose wind reverses on day 12.
//! let reftime = NaiveDate::from_ymd_opt(2018, 2, 1).unwrap();
//! let wind = Array5::from_shape_fn((1, 1, 1, 30, 1), |(_, _, _, l, _)| 12.0 - l as f64);
//! let series = Forecast::new(vec![reftime], vec![0], vec![0], (0..30).collect(), wind).unwrap();
//!
//! let events = find_threshold_event(&series, &EventConfig::new()).unwrap();
//! assert_eq!(events[0].trigger_day(), 13);
//!
//! let comp = composite(&events, &series).unwrap();
//! assert_eq!(comp.lagtimes()[0], -13);
//! ```

mod composite;
mod detect;
mod error;
mod event;
mod exchange;
mod extreme;

pub use composite::{Composite, CompositeStatistics, DEFAULT_PERCENTILES, composite};
pub use detect::{EffectSize, EventConfig, find_threshold_event};
pub use error::EventError;
pub use event::Event;
pub use exchange::{
    DurationKey, WriteOptions, events_from_json, events_to_json, read_event_files,
    read_event_records, reftime_path, rename_event_keys, split_by_reftime, write_event_records,
    write_events,
};
pub use extreme::{
    BootstrapConfig, BootstrapEstimate, bootstrap_extreme_probability, extreme_fractions,
    integrated_extreme_probability, is_extreme,
};

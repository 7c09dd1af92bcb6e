//! JSON exchange format for event lists.
//!
//! An event list is a JSON array of records:
//!
//! ```json
//! [{"fc": {"reftime": "2017-01-02", "hc_year": -3, "number": 4}, "leadtime": "P20DT0H0M0S"}]
//! ```
//!
//! The trigger day is written either as an ISO 8601 duration under
//! `leadtime` or as an integer under `days_since_init`. Both keys are
//! accepted when reading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use s2s_calendar::{format_iso_duration, parse_iso_duration};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::EventError;
use crate::event::Event;

/// Key under which the trigger day is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationKey {
    /// ISO 8601 duration string under `leadtime`.
    #[default]
    Leadtime,
    /// Integer day count under `days_since_init`.
    DaysSinceInit,
}

/// Options for [`write_events`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    split_reftimes: bool,
    duration_key: DurationKey,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one file per reftime, suffixed `_ref<YYYYMMDD>`.
    pub fn with_split_reftimes(mut self, split: bool) -> Self {
        self.split_reftimes = split;
        self
    }

    pub fn with_duration_key(mut self, key: DurationKey) -> Self {
        self.duration_key = key;
        self
    }

    pub fn split_reftimes(&self) -> bool {
        self.split_reftimes
    }

    pub fn duration_key(&self) -> DurationKey {
        self.duration_key
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForecastKey {
    reftime: String,
    hc_year: i32,
    number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRecord {
    fc: ForecastKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    leadtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_since_init: Option<i64>,
}

impl EventRecord {
    fn from_event(event: &Event, key: DurationKey) -> Self {
        let (leadtime, days_since_init) = match key {
            DurationKey::Leadtime => (Some(format_iso_duration(event.trigger_day())), None),
            DurationKey::DaysSinceInit => (None, Some(event.trigger_day())),
        };
        Self {
            fc: ForecastKey {
                reftime: event.reftime().format("%Y-%m-%d").to_string(),
                hc_year: event.hc_year(),
                number: event.number(),
            },
            leadtime,
            days_since_init,
        }
    }

    fn into_event(self, index: usize) -> Result<Event, EventError> {
        let malformed = |reason: String| EventError::MalformedEvent { index, reason };

        // Timestamps such as "2017-01-02T00:00:00" carry the date up front.
        let date_part = self.fc.reftime.get(..10).unwrap_or(&self.fc.reftime);
        let reftime = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| malformed(format!("reftime '{}': {e}", self.fc.reftime)))?;

        let trigger_day = match (self.leadtime, self.days_since_init) {
            (Some(iso), _) => parse_iso_duration(&iso)
                .map_err(|e| malformed(format!("leadtime '{iso}': {e}")))?,
            (None, Some(days)) => days,
            (None, None) => {
                return Err(malformed(
                    "missing 'leadtime' or 'days_since_init'".to_string(),
                ));
            }
        };
        Ok(Event::new(reftime, self.fc.hc_year, self.fc.number, trigger_day))
    }
}

/// Serializes events to a JSON array.
pub fn events_to_json(events: &[Event], key: DurationKey) -> Result<String, EventError> {
    let records: Vec<EventRecord> = events
        .iter()
        .map(|ev| EventRecord::from_event(ev, key))
        .collect();
    Ok(serde_json::to_string(&records)?)
}

/// Parses a JSON array of event records.
///
/// # Errors
///
/// Returns [`EventError::Json`] if `text` is not a JSON array and
/// [`EventError::MalformedEvent`] for the first record that cannot be decoded.
pub fn events_from_json(text: &str) -> Result<Vec<Event>, EventError> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: EventRecord =
                serde_json::from_value(value).map_err(|e| EventError::MalformedEvent {
                    index,
                    reason: e.to_string(),
                })?;
            record.into_event(index)
        })
        .collect()
}

/// Reads and concatenates the event lists stored in `paths`.
pub fn read_event_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Event>, EventError> {
    let mut events = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let text = read_to_string(path)?;
        let parsed = events_from_json(&text)?;
        debug!(path = %path.display(), n_events = parsed.len(), "read event list");
        events.extend(parsed);
    }
    Ok(events)
}

/// Groups events by reftime, keeping groups and their members in
/// first-seen order.
pub fn split_by_reftime(events: &[Event]) -> Vec<(NaiveDate, Vec<Event>)> {
    let mut groups: Vec<(NaiveDate, Vec<Event>)> = Vec::new();
    for &event in events {
        match groups.iter_mut().find(|(r, _)| *r == event.reftime()) {
            Some((_, group)) => group.push(event),
            None => groups.push((event.reftime(), vec![event])),
        }
    }
    groups
}

/// Path of the per-reftime file derived from `path`.
///
/// `out/ssw.json` with reftime 2017-01-02 becomes `out/ssw_ref20170102.json`.
pub fn reftime_path(path: &Path, reftime: NaiveDate) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_ref{}.json", reftime.format("%Y%m%d")))
}

/// Writes events to `path`, creating parent directories as needed.
///
/// With [`WriteOptions::with_split_reftimes`] one file per reftime is
/// written next to `path` instead. Returns the paths written.
pub fn write_events(
    events: &[Event],
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>, EventError> {
    let path = path.as_ref();
    let files: Vec<(PathBuf, Vec<Event>)> = if options.split_reftimes {
        split_by_reftime(events)
            .into_iter()
            .map(|(reftime, group)| (reftime_path(path, reftime), group))
            .collect()
    } else {
        vec![(path.to_path_buf(), events.to_vec())]
    };

    let mut written = Vec::with_capacity(files.len());
    for (file, group) in files {
        let text = events_to_json(&group, options.duration_key)?;
        write_string(&file, &text)?;
        written.push(file);
    }
    info!(n_events = events.len(), n_files = written.len(), "event list written");
    Ok(written)
}

/// Reads an event list as raw JSON objects, without interpreting them.
pub fn read_event_records(path: impl AsRef<Path>) -> Result<Vec<Value>, EventError> {
    let path = path.as_ref();
    Ok(serde_json::from_str(&read_to_string(path)?)?)
}

/// Writes raw JSON records to `path`, creating parent directories as needed.
pub fn write_event_records(records: &[Value], path: impl AsRef<Path>) -> Result<(), EventError> {
    write_string(path.as_ref(), &serde_json::to_string(records)?)
}

/// Renames top-level keys of every record. Records are copied; keys absent
/// from a record and non-object records are left as they are.
pub fn rename_event_keys(records: &[Value], mapping: &BTreeMap<String, String>) -> Vec<Value> {
    records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if let Value::Object(fields) = &mut record {
                for (old, new) in mapping {
                    if let Some(value) = fields.remove(old) {
                        fields.insert(new.clone(), value);
                    }
                }
            }
            record
        })
        .collect()
}

fn read_to_string(path: &Path) -> Result<String, EventError> {
    fs::read_to_string(path).map_err(|e| EventError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_string(path: &Path, text: &str) -> Result<(), EventError> {
    let io_err = |e: std::io::Error| EventError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn writes_iso_leadtime() {
        let json = events_to_json(&[Event::new(d(2017, 1, 2), -3, 4, 20)], DurationKey::Leadtime)
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            json!([{"fc": {"reftime": "2017-01-02", "hc_year": -3, "number": 4}, "leadtime": "P20DT0H0M0S"}])
        );
    }

    #[test]
    fn writes_day_count() {
        let json = events_to_json(&[Event::new(d(2017, 1, 2), 0, 0, 7)], DurationKey::DaysSinceInit)
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["days_since_init"], json!(7));
        assert!(value[0].get("leadtime").is_none());
    }

    #[test]
    fn reads_both_keys_and_timestamps() {
        let text = r#"[
            {"fc": {"reftime": "2017-01-02T00:00:00", "hc_year": -1, "number": 0}, "leadtime": "P12DT0H0M0S"},
            {"fc": {"reftime": "2017-01-09", "hc_year": 0, "number": 3}, "days_since_init": 15}
        ]"#;
        let events = events_from_json(text).unwrap();
        assert_eq!(
            events,
            vec![
                Event::new(d(2017, 1, 2), -1, 0, 12),
                Event::new(d(2017, 1, 9), 0, 3, 15),
            ]
        );
    }

    #[test]
    fn reports_malformed_record() {
        let text = r#"[
            {"fc": {"reftime": "2017-01-02", "hc_year": -1, "number": 0}, "leadtime": "P1D"},
            {"fc": {"reftime": "2017-01-02", "hc_year": -1, "number": 0}}
        ]"#;
        assert!(matches!(
            events_from_json(text),
            Err(EventError::MalformedEvent { index: 1, .. })
        ));
        let text = r#"[{"fc": {"reftime": "02.01.2017", "hc_year": 0, "number": 0}, "leadtime": "P1D"}]"#;
        assert!(matches!(
            events_from_json(text),
            Err(EventError::MalformedEvent { index: 0, .. })
        ));
        assert!(matches!(events_from_json("{}"), Err(EventError::Json { .. })));
    }

    #[test]
    fn groups_by_reftime_in_first_seen_order() {
        let events = [
            Event::new(d(2017, 1, 9), 0, 0, 1),
            Event::new(d(2017, 1, 2), 0, 0, 1),
            Event::new(d(2017, 1, 9), -1, 0, 2),
        ];
        let groups = split_by_reftime(&events);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, d(2017, 1, 9));
        assert_eq!(groups[0].1, vec![events[0], events[2]]);
        assert_eq!(groups[1].1, vec![events[1]]);
    }

    #[test]
    fn reftime_suffix() {
        assert_eq!(
            reftime_path(Path::new("out/ssw.json"), d(2017, 1, 2)),
            PathBuf::from("out/ssw_ref20170102.json")
        );
    }

    #[test]
    fn renames_top_level_keys() {
        let records = vec![
            json!({"fc": {"reftime": "2017-01-02"}, "leadtime": "P1DT0H0M0S"}),
            json!({"fc": {"reftime": "2017-01-09"}, "days_since_init": 3}),
        ];
        let mapping = BTreeMap::from([("leadtime".to_string(), "days_since_init".to_string())]);
        let renamed = rename_event_keys(&records, &mapping);
        assert_eq!(renamed[0]["days_since_init"], json!("P1DT0H0M0S"));
        assert!(renamed[0].get("leadtime").is_none());
        assert_eq!(renamed[1], records[1]);
        // input untouched
        assert!(records[0].get("leadtime").is_some());
    }
}

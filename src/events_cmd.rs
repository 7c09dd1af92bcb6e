//! Event-list commands: normalize, summary and rename-key.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use s2s_calendar::winter_season;
use s2s_events::{
    Event, read_event_files, read_event_records, rename_event_keys, write_event_records,
    write_events,
};

use crate::cli::{NormalizeArgs, RenameKeyArgs, SummaryArgs};
use crate::config::S2sConfig;
use crate::convert::{self, GroupBy};

/// Merge event lists and write them back in canonical form.
pub fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let _cmd = info_span!("normalize").entered();
    let config = S2sConfig::load(&args.config)?;
    let options =
        convert::build_write_options(&config.events, args.split, args.duration_key.as_deref())?;

    let events = read_event_files(&args.inputs).context("failed to read event lists")?;
    info!(n_files = args.inputs.len(), n_events = events.len(), "event lists loaded");

    let written = write_events(&events, &args.output, &options)
        .with_context(|| format!("failed to write events to {}", args.output.display()))?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Print event counts, split into hindcast and real-time events.
pub fn run_summary(args: SummaryArgs) -> Result<()> {
    let _cmd = info_span!("summary").entered();
    let config = S2sConfig::load(&args.config)?;
    let group_by =
        convert::parse_group_by(args.group_by.as_deref().unwrap_or(&config.summary.group_by))?;

    let events = read_event_files(&args.inputs).context("failed to read event lists")?;
    let rows = summarize(&events, group_by)?;

    println!("{:<12} {:>9} {:>9}", "group", "hindcast", "realtime");
    for (label, counts) in &rows {
        println!("{label:<12} {:>9} {:>9}", counts.hindcast, counts.realtime);
    }
    let total_hc: usize = rows.values().map(|c| c.hindcast).sum();
    let total_rt: usize = rows.values().map(|c| c.realtime).sum();
    println!("{:<12} {total_hc:>9} {total_rt:>9}", "total");
    Ok(())
}

/// Rename top-level keys of every record in an event list.
pub fn run_rename_key(args: RenameKeyArgs) -> Result<()> {
    let _cmd = info_span!("rename_key").entered();
    let mapping = convert::parse_renames(&args.renames)?;

    let records = read_event_records(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let renamed = rename_event_keys(&records, &mapping);
    write_event_records(&renamed, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(n_records = renamed.len(), n_renames = mapping.len(), "keys renamed");
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub hindcast: usize,
    pub realtime: usize,
}

/// Counts events per group, ordered by group label.
pub fn summarize(events: &[Event], group_by: GroupBy) -> Result<BTreeMap<String, Counts>> {
    let mut rows: BTreeMap<String, Counts> = BTreeMap::new();
    for event in events {
        let label = match group_by {
            GroupBy::Reftime => event.reftime().format("%Y-%m-%d").to_string(),
            GroupBy::Season => winter_season(event.validtime()?),
        };
        let counts = rows.entry(label).or_default();
        if event.is_realtime() {
            counts.realtime += 1;
        } else {
            counts.hindcast += 1;
        }
    }
    Ok(rows)
}

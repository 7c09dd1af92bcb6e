//! Pure conversion functions: TOML and CLI strings -> crate API types.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use s2s_events::{DurationKey, WriteOptions};

use crate::config::EventsToml;

/// How the `summary` subcommand groups events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Reftime,
    /// Winter season of the event's validtime.
    Season,
}

/// Parses a duration key name into the corresponding enum variant.
pub fn parse_duration_key(s: &str) -> Result<DurationKey> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "leadtime" => Ok(DurationKey::Leadtime),
        "days_since_init" => Ok(DurationKey::DaysSinceInit),
        other => bail!("unknown duration key: {other:?}"),
    }
}

/// Parses a summary grouping name into the corresponding enum variant.
pub fn parse_group_by(s: &str) -> Result<GroupBy> {
    match s.to_lowercase().as_str() {
        "reftime" => Ok(GroupBy::Reftime),
        "season" | "winter" => Ok(GroupBy::Season),
        other => bail!("unknown grouping: {other:?}"),
    }
}

/// Parses repeated `old=new` arguments into a rename mapping.
pub fn parse_renames(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut mapping = BTreeMap::new();
    for pair in pairs {
        let Some((old, new)) = pair.split_once('=') else {
            bail!("rename must look like old=new, got {pair:?}");
        };
        let (old, new) = (old.trim(), new.trim());
        if old.is_empty() || new.is_empty() {
            bail!("rename must name both keys, got {pair:?}");
        }
        if mapping.insert(old.to_string(), new.to_string()).is_some() {
            bail!("key {old:?} renamed twice");
        }
    }
    Ok(mapping)
}

/// Builds [`WriteOptions`] from the TOML events section. CLI flags win when set.
pub fn build_write_options(
    events: &EventsToml,
    split: bool,
    duration_key: Option<&str>,
) -> Result<WriteOptions> {
    let key = parse_duration_key(duration_key.unwrap_or(&events.duration_key))?;
    Ok(WriteOptions::new()
        .with_split_reftimes(split || events.split_reftimes)
        .with_duration_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_key_names() {
        assert_eq!(parse_duration_key("leadtime").unwrap(), DurationKey::Leadtime);
        assert_eq!(
            parse_duration_key("days-since-init").unwrap(),
            DurationKey::DaysSinceInit
        );
        assert!(parse_duration_key("hours").is_err());
    }

    #[test]
    fn group_by_names() {
        assert_eq!(parse_group_by("Season").unwrap(), GroupBy::Season);
        assert_eq!(parse_group_by("reftime").unwrap(), GroupBy::Reftime);
        assert!(parse_group_by("month").is_err());
    }

    #[test]
    fn renames() {
        let mapping =
            parse_renames(&["leadtime=days_since_init".into(), " fc = forecast ".into()]).unwrap();
        assert_eq!(mapping["leadtime"], "days_since_init");
        assert_eq!(mapping["fc"], "forecast");
        assert!(parse_renames(&["leadtime".into()]).is_err());
        assert!(parse_renames(&["=x".into()]).is_err());
        assert!(parse_renames(&["a=b".into(), "a=c".into()]).is_err());
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = EventsToml::default();
        let opts = build_write_options(&toml, true, Some("days_since_init")).unwrap();
        assert!(opts.split_reftimes());
        assert_eq!(opts.duration_key(), DurationKey::DaysSinceInit);
        let opts = build_write_options(&toml, false, None).unwrap();
        assert!(!opts.split_reftimes());
        assert_eq!(opts.duration_key(), DurationKey::Leadtime);
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration read from `s2s.toml`.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct S2sConfig {
    /// Event list output settings.
    #[serde(default)]
    pub events: EventsToml,

    /// Summary settings.
    #[serde(default)]
    pub summary: SummaryToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsToml {
    #[serde(default = "default_duration_key")]
    pub duration_key: String,
    #[serde(default)]
    pub split_reftimes: bool,
}

impl Default for EventsToml {
    fn default() -> Self {
        Self {
            duration_key: default_duration_key(),
            split_reftimes: false,
        }
    }
}

fn default_duration_key() -> String {
    "leadtime".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryToml {
    #[serde(default = "default_group_by")]
    pub group_by: String,
}

impl Default for SummaryToml {
    fn default() -> Self {
        Self {
            group_by: default_group_by(),
        }
    }
}

fn default_group_by() -> String {
    "season".to_string()
}

impl S2sConfig {
    /// Loads the configuration at `path`, falling back to the defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: S2sConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.events.duration_key, "leadtime");
        assert!(!cfg.events.split_reftimes);
        assert_eq!(cfg.summary.group_by, "season");
    }

    #[test]
    fn parses_sections() {
        let cfg: S2sConfig = toml::from_str(
            r#"
            [events]
            duration_key = "days_since_init"
            split_reftimes = true

            [summary]
            group_by = "reftime"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.events.duration_key, "days_since_init");
        assert!(cfg.events.split_reftimes);
        assert_eq!(cfg.summary.group_by, "reftime");
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(toml::from_str::<S2sConfig>("[events]\nformat = \"csv\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = S2sConfig::load(&dir.path().join("s2s.toml")).unwrap();
        assert_eq!(cfg.summary.group_by, "season");
    }
}

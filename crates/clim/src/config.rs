//! Configuration for climatology and anomaly computation.

use std::fmt;
use std::str::FromStr;

use crate::error::ClimError;

/// Statistic aggregated into a climatology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Statistic {
    /// Mean over all hindcast years and members.
    #[default]
    Mean,
    /// Population standard deviation over hindcast years of the control member.
    Std,
}

impl Statistic {
    /// Lower-case name, as used in config files and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = ClimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "std" => Ok(Self::Std),
            _ => Err(ClimError::UnknownStatistic {
                name: s.to_string(),
            }),
        }
    }
}

/// How hindcast samples from neighbouring reftimes are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Grouping {
    /// Pool samples with the same leadtime, regardless of their reftime.
    #[default]
    Leadtime,
    /// Pool samples valid on the same day: a sample from reftime `t` at
    /// leadtime `l` is keyed by `(t - r) + l` days for target reftime `r`.
    ValidDay,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leadtime => f.write_str("leadtime"),
            Self::ValidDay => f.write_str("validday"),
        }
    }
}

impl FromStr for Grouping {
    type Err = ClimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leadtime" => Ok(Self::Leadtime),
            "validday" | "valid_day" | "validtime" => Ok(Self::ValidDay),
            _ => Err(ClimError::UnsupportedGrouping {
                name: s.to_string(),
            }),
        }
    }
}

/// Configuration for [`crate::climatology`].
///
/// # Example
///
/// ```
/// use s2s_clim::{ClimatologyConfig, Grouping, Statistic};
///
/// let config = ClimatologyConfig::new()
///     .with_window_size(21)
///     .with_statistic(Statistic::Std)
///     .with_grouping(Grouping::ValidDay);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.smoothing_window(), 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyConfig {
    /// Half-width of the training window in days.
    window_size: u32,
    /// Aggregated statistic.
    statistic: Statistic,
    /// Width of the centered running mean applied to the profile.
    smoothing_window: usize,
    /// Sample keying.
    grouping: Grouping,
    /// Silences diagnostic warnings.
    suppress_warnings: bool,
}

impl ClimatologyConfig {
    /// Creates a configuration with the defaults.
    ///
    /// Defaults: `window_size = 15`, `statistic = Mean`,
    /// `smoothing_window = 7`, `grouping = Leadtime`, warnings enabled.
    pub fn new() -> Self {
        Self {
            window_size: 15,
            statistic: Statistic::Mean,
            smoothing_window: 7,
            grouping: Grouping::Leadtime,
            suppress_warnings: false,
        }
    }

    /// Sets the training window half-width in days.
    pub fn with_window_size(mut self, days: u32) -> Self {
        self.window_size = days;
        self
    }

    /// Sets the statistic.
    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Sets the running-mean width. `1` disables smoothing.
    pub fn with_smoothing_window(mut self, width: usize) -> Self {
        self.smoothing_window = width;
        self
    }

    /// Sets the sample grouping.
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Silences diagnostic warnings.
    pub fn with_suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }

    /// Returns the training window half-width in days.
    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    /// Returns the statistic.
    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Returns the running-mean width.
    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    /// Returns the sample grouping.
    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// Returns whether diagnostic warnings are silenced.
    pub fn suppress_warnings(&self) -> bool {
        self.suppress_warnings
    }

    /// Validates this configuration.
    ///
    /// Returns an error if `smoothing_window` is zero.
    pub fn validate(&self) -> Result<(), ClimError> {
        if self.smoothing_window == 0 {
            return Err(ClimError::InvalidConfig {
                reason: "smoothing_window must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ClimatologyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for [`crate::anomaly`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyConfig {
    climatology: ClimatologyConfig,
    standardize: bool,
}

impl AnomalyConfig {
    /// Creates a configuration with default climatology settings and no
    /// standardization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the climatology settings. The statistic is ignored.
    pub fn with_climatology(mut self, climatology: ClimatologyConfig) -> Self {
        self.climatology = climatology;
        self
    }

    /// Divides anomalies by the standard deviation climatology.
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    /// Returns the climatology settings.
    pub fn climatology(&self) -> &ClimatologyConfig {
        &self.climatology
    }

    /// Returns whether anomalies are standardized.
    pub fn standardize(&self) -> bool {
        self.standardize
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ClimError> {
        self.climatology.validate()
    }
}

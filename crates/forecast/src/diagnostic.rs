//! Structured warnings for data sparsity.
//!
//! Sparse data never aborts a computation. Instead each affected step records
//! a [`Diagnostic`] on its result and, unless the caller suppressed it, logs
//! the same message through `tracing::warn!`.

use std::fmt;

use chrono::NaiveDate;

/// A non-fatal condition encountered while processing forecasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No training reftime carried hindcast data inside the window.
    EmptyTrainingWindow {
        /// Reftime whose climatology is all missing.
        reftime: NaiveDate,
    },
    /// Leadtimes without coverage were filled by linear extrapolation.
    Extrapolated {
        /// Reftime whose climatology was extended.
        reftime: NaiveDate,
        /// Name of the statistic (`"mean"` or `"std"`).
        statistic: &'static str,
        /// Number of leadtimes without coverage.
        n_days: usize,
    },
    /// An event referenced a reftime that is absent from the data.
    MissingReftime {
        /// The absent reftime.
        reftime: NaiveDate,
    },
    /// The reftime could not be inferred and a default was used.
    ReftimeNotInferred {
        /// File name or other source label, if any.
        source: Option<String>,
    },
}

impl Diagnostic {
    /// Logs the diagnostic at `warn` level.
    pub fn emit(&self) {
        tracing::warn!("{self}");
    }

    /// Logs the diagnostic unless `suppress` is set.
    pub fn emit_unless(&self, suppress: bool) {
        if !suppress {
            self.emit();
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTrainingWindow { reftime } => {
                write!(f, "no hindcast data in training window of reftime {reftime}")
            }
            Self::Extrapolated {
                reftime,
                statistic,
                n_days,
            } => write!(
                f,
                "{statistic} climatology of reftime {reftime} extrapolated over {n_days} leadtime(s)"
            ),
            Self::MissingReftime { reftime } => {
                write!(f, "reftime {reftime} not present in data, events skipped")
            }
            Self::ReftimeNotInferred { source } => match source {
                Some(s) => write!(f, "could not infer reftime from '{s}', using time axis"),
                None => write!(f, "no reftime given and no source to infer it from, using time axis"),
            },
        }
    }
}

//! # s2s-clim
//!
//! Hindcast climatologies and anomalies for sub-seasonal forecasts.
//!
//! Each reftime gets its own climatology, built from the hindcasts of all
//! reftimes within a window of days around it. Anomalies subtract the mean
//! climatology and optionally divide by the standard deviation climatology.
//!
//! ## Quick Start
//!
//! ```no_run
//! use s2s_clim::{AnomalyConfig, ClimatologyConfig, anomaly};
//! # fn load() -> s2s_forecast::Forecast { unimplemented!() }
//!
//! let data = load();
//! let config = AnomalyConfig::new()
//!     .with_climatology(ClimatologyConfig::new().with_window_size(15))
//!     .with_standardize(true);
//! let anom = anomaly(&data, &config).unwrap();
//! for diagnostic in anom.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`ClimatologyConfig`], [`AnomalyConfig`], [`Statistic`], [`Grouping`] |
//! | `climatology` | Per-reftime climatology profiles |
//! | `anomaly` | Plain and standardized anomalies |
//! | `profile` | Running mean and linear gap filling |
//! | `nam` | Polar-cap means and the NAM index |
//! | `error` | Error types |

mod anomaly;
mod climatology;
mod config;
mod error;
mod nam;
mod profile;

pub use anomaly::{Anomaly, anomaly};
pub use climatology::{Climatology, climatology};
pub use config::{AnomalyConfig, ClimatologyConfig, Grouping, Statistic};
pub use error::ClimError;
pub use nam::{NAM_CAP_LATITUDE, nam_index, polar_cap_mean};

//! # s2s-forecast
//!
//! Labeled sub-seasonal to seasonal forecast archives.
//!
//! A [`Forecast`] holds real-time forecasts and hindcasts on the canonical
//! axes `(reftime, hc_year, number, leadtime, cell)`. Raw files arrive on a
//! flat `time` axis and are brought onto these axes by [`reindex`]; several
//! re-indexed files are joined with [`Forecast::combine`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `forecast` | [`Forecast`] container, validtime derivation, outer join |
//! | `raw` | [`RawForecast`] as read from a single file |
//! | `reindex` | Real-time/hindcast classification and re-indexing |
//! | `filename` | Reftime inference from file names |
//! | `diagnostic` | [`Diagnostic`] warnings shared by downstream crates |
//! | `error` | Error types |

mod diagnostic;
mod error;
mod filename;
mod forecast;
mod raw;
mod reindex;

pub use diagnostic::Diagnostic;
pub use error::ForecastError;
pub use filename::infer_reftime_from_filename;
pub use forecast::Forecast;
pub use raw::RawForecast;
pub use reindex::{ReindexConfig, Reindexed, reindex};

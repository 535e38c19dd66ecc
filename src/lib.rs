//! Hotel booking cancellation predictor: cleaning and feature pipeline,
//! classifiers, evaluation, single-booking prediction and a booking store.

/// Application directory helpers.
pub mod app_dirs;
/// Append-only SQLite booking store.
pub mod bookings;
/// Command-line parsing and dispatch.
pub mod cli;
/// TOML pipeline configuration.
pub mod config;
/// Pipeline error type.
pub mod error;
/// Atomic file writes.
pub mod fs_ops;
/// Tracing subscriber setup.
pub mod logging;
/// In-crate classifiers and metrics.
pub mod ml;
/// Cleaning, training, scoring and evaluation stages.
pub mod pipeline;
/// Polars data frame helpers and CSV IO.
pub mod table;

pub use error::{PipelineError, PipelineResult};

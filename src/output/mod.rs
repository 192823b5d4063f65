//! Output module for run reporting
//!
//! Ratings are not persisted; the only output of a run is its log and the
//! statistics summarised here.

mod stats;

pub use stats::{log_statistics, RunStatistics};

//! Data Validation and Cleaning
//!
//! Turns a raw telemetry window into the cleaned, time-ordered rows the
//! diagnostics pipeline analyses.

mod cleaner;
mod error;

pub use cleaner::{CleanedWindow, CleanerConfig, WindowCleaner, DEFAULT_MIN_CHANNELS};
pub use error::ValidationError;

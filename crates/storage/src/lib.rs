//! Storage Layer
//!
//! Window sources feeding the diagnostics pipeline: the in-memory live
//! store fed by the ingest endpoint, fixed windows, and CSV import.

pub mod csv_source;
mod repository;
mod source;

pub use repository::{Repository, DEFAULT_MAX_ROWS_PER_VEHICLE};
pub use source::{StaticWindow, WindowSource};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No telemetry for motorcycle {0}")]
    NotFound(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid window length: {0} minutes")]
    InvalidWindow(u32),
}

//! Validation Error Types

use thiserror::Error;

/// Reasons a telemetry row is rejected from an analysis window
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Too few channels carried a value
    #[error("row has {present} of {total} channels, at least {required} required")]
    InsufficientChannels {
        present: usize,
        required: usize,
        total: usize,
    },

    /// All six channels read zero (adapter dropout)
    #[error("all channels read zero (sensor dropout)")]
    Dropout,

    /// A channel carried a non-finite value
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
}

//! Window Cleaning
//!
//! Drops rows that cannot be analysed and restores time order before the
//! window is gated and handed to the model and rule stages.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use telemetry::{Channel, SampleRow, CHANNEL_COUNT};
use tracing::debug;

/// Minimum channels a row must carry to be kept
pub const DEFAULT_MIN_CHANNELS: usize = 4;

/// Cleaning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Rows with fewer present channels are dropped
    pub min_channels: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            min_channels: DEFAULT_MIN_CHANNELS,
        }
    }
}

/// Outcome of cleaning one window
#[derive(Debug, Clone, Default)]
pub struct CleanedWindow {
    /// Surviving rows, ascending by timestamp
    pub rows: Vec<SampleRow>,
    /// Rows dropped as all-zero dropout
    pub dropped_dropout: usize,
    /// Rows dropped for missing channels or non-finite values
    pub dropped_invalid: usize,
}

impl CleanedWindow {
    /// Number of usable rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when nothing survived cleaning
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the window holds at least `min_rows` usable rows
    pub fn meets(&self, min_rows: usize) -> bool {
        self.rows.len() >= min_rows
    }
}

/// Row cleaner applied to every fetched window
pub struct WindowCleaner {
    config: CleanerConfig,
}

impl WindowCleaner {
    /// Create a new cleaner with given config
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Check a single row
    pub fn validate_row(&self, row: &SampleRow) -> Result<(), ValidationError> {
        for channel in Channel::ALL {
            if let Some(value) = row.get(channel) {
                if !value.is_finite() {
                    return Err(ValidationError::NonFinite {
                        field: channel.as_str(),
                    });
                }
            }
        }

        let present = row.present_count();
        if present < self.config.min_channels {
            return Err(ValidationError::InsufficientChannels {
                present,
                required: self.config.min_channels,
                total: CHANNEL_COUNT,
            });
        }

        if row.is_dropout() {
            return Err(ValidationError::Dropout);
        }

        Ok(())
    }

    /// Clean a raw window
    pub fn clean(&self, rows: Vec<SampleRow>) -> CleanedWindow {
        let mut window = CleanedWindow {
            rows: Vec::with_capacity(rows.len()),
            ..Default::default()
        };

        for row in rows {
            match self.validate_row(&row) {
                Ok(()) => window.rows.push(row),
                Err(ValidationError::Dropout) => window.dropped_dropout += 1,
                Err(_) => window.dropped_invalid += 1,
            }
        }

        window.rows.sort_by_key(|r| r.timestamp);

        debug!(
            "Cleaned window: kept={}, dropout={}, invalid={}",
            window.rows.len(),
            window.dropped_dropout,
            window.dropped_invalid
        );

        window
    }
}

impl Default for WindowCleaner {
    fn default() -> Self {
        Self::new(CleanerConfig::default())
    }
}

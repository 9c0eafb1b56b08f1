//! Severity Classifier

use crate::ranges::{ReferenceRange, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use telemetry::Channel;
use tracing::debug;

/// Score reported when no reference range is available
pub const UNKNOWN_SCORE: i32 = -1;

/// Threshold classification of a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Normal,
    Warning,
    Critical,
    /// No reference range for this vehicle and channel
    Unknown,
}

impl Classification {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Normal => "normal",
            Classification::Warning => "warning",
            Classification::Critical => "critical",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value against its reference range
pub fn classify(range: &ReferenceRange, value: f64) -> Classification {
    if value <= range.critical_min || value >= range.critical_max {
        Classification::Critical
    } else if value <= range.warning_min || value >= range.warning_max {
        Classification::Warning
    } else {
        Classification::Normal
    }
}

/// Severity score in [0, 100]: 0 inside the warning band, then linear from
/// the exceeded warning bound to the matching critical bound
pub fn score(range: &ReferenceRange, value: f64) -> i32 {
    let progress = if value > range.warning_max {
        let span = range.critical_max - range.warning_max;
        if span > 0.0 {
            (value - range.warning_max) / span
        } else {
            1.0
        }
    } else if value < range.warning_min {
        let span = range.warning_min - range.critical_min;
        if span > 0.0 {
            (range.warning_min - value) / span
        } else {
            1.0
        }
    } else {
        0.0
    };

    (progress * 100.0).round().clamp(0.0, 100.0) as i32
}

/// Classification and score for one channel value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub classification: Classification,
    pub score: i32,
}

impl Assessment {
    /// Assessment used when no reference range exists
    pub fn unknown() -> Self {
        Self {
            classification: Classification::Unknown,
            score: UNKNOWN_SCORE,
        }
    }
}

/// Classifier bound to a reference table
#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    table: Arc<ReferenceTable>,
}

impl SeverityClassifier {
    /// Create a classifier over a shared reference table
    pub fn new(table: Arc<ReferenceTable>) -> Self {
        Self { table }
    }

    /// Reference range for a vehicle model's channel, if configured
    pub fn range(&self, brand: &str, model: &str, channel: Channel) -> Option<&ReferenceRange> {
        self.table.lookup(brand, model, channel).ok()
    }

    /// Classify and score a value; degrades to `Unknown` / -1 when the
    /// reference is missing
    pub fn assess(&self, brand: &str, model: &str, channel: Channel, value: f64) -> Assessment {
        match self.table.lookup(brand, model, channel) {
            Ok(range) => Assessment {
                classification: classify(range, value),
                score: score(range, value),
            },
            Err(e) => {
                debug!("Severity unknown: {}", e);
                Assessment::unknown()
            }
        }
    }
}

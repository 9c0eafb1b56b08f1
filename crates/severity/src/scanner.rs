//! Row-Level Scanner
//!
//! Classifies every channel of every row against the reference ranges.
//! The verdict is independent of the learned model.

use crate::classifier::{Classification, SeverityClassifier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use telemetry::{Channel, SampleRow};
use tracing::debug;

/// Round to two decimals for reporting
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A row with at least one channel outside its normal band
#[derive(Debug, Clone, Serialize)]
pub struct RowAnomaly {
    /// Position in the cleaned window
    pub row_index: usize,
    /// Sample time
    pub time: DateTime<Utc>,
    /// One line per channel that is not normal
    pub issues: Vec<String>,
    /// Raw channel values
    pub values: BTreeMap<Channel, Option<f64>>,
    /// Classification of each present channel
    pub severity: BTreeMap<Channel, Classification>,
}

/// Scanner output for one window
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub anomalies: Vec<RowAnomaly>,
    pub total_rows: usize,
}

impl ScanResult {
    /// Number of rows with at least one issue
    pub fn rows_with_issues(&self) -> usize {
        self.anomalies.len()
    }

    /// Share of rows with issues, in percent with two decimals
    pub fn anomaly_percent(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        round2(self.rows_with_issues() as f64 / self.total_rows as f64 * 100.0)
    }
}

/// Scanner bound to one vehicle model
pub struct RowScanner<'a> {
    classifier: &'a SeverityClassifier,
    brand: &'a str,
    model: &'a str,
}

impl<'a> RowScanner<'a> {
    /// Create a scanner for a vehicle model
    pub fn new(classifier: &'a SeverityClassifier, brand: &'a str, model: &'a str) -> Self {
        Self {
            classifier,
            brand,
            model,
        }
    }

    /// Scan a single row; `None` when every present channel is normal
    pub fn scan_row(&self, row_index: usize, row: &SampleRow) -> Option<RowAnomaly> {
        let mut issues = Vec::new();
        let mut severity = BTreeMap::new();

        for channel in Channel::ALL {
            let Some(value) = row.get(channel) else {
                continue;
            };
            let assessment = self.classifier.assess(self.brand, self.model, channel, value);
            match assessment.classification {
                Classification::Normal => {}
                Classification::Unknown => {
                    issues.push(format!("{} unknown (no reference)", channel))
                }
                classification => issues.push(format!(
                    "{} {} ({} {})",
                    channel,
                    classification,
                    round2(value),
                    channel.unit()
                )),
            }
            severity.insert(channel, assessment.classification);
        }

        if issues.is_empty() {
            return None;
        }

        Some(RowAnomaly {
            row_index,
            time: row.timestamp,
            issues,
            values: Channel::ALL.iter().map(|c| (*c, row.get(*c))).collect(),
            severity,
        })
    }

    /// Scan a cleaned window
    pub fn scan(&self, rows: &[SampleRow]) -> ScanResult {
        let anomalies: Vec<_> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| self.scan_row(i, row))
            .collect();

        debug!("Row scan: {} of {} rows flagged", anomalies.len(), rows.len());

        ScanResult {
            anomalies,
            total_rows: rows.len(),
        }
    }
}

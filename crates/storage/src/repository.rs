//! Repository Implementation

use crate::source::WindowSource;
use crate::SourceError;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use telemetry::SampleRow;
use tracing::{debug, info};

/// Rows retained per motorcycle (one week at one sample every 5 s)
pub const DEFAULT_MAX_ROWS_PER_VEHICLE: usize = 120_960;

/// In-memory live telemetry store, keyed by motorcycle id
pub struct Repository {
    /// Rows per motorcycle, in arrival order
    rows: Mutex<HashMap<String, VecDeque<SampleRow>>>,
    /// Retention per motorcycle
    max_rows_per_vehicle: usize,
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_MAX_ROWS_PER_VEHICLE)
    }

    /// Create a repository keeping at most `max_rows_per_vehicle` rows each
    pub fn with_retention(max_rows_per_vehicle: usize) -> Self {
        info!(
            "Creating in-memory repository (retention {} rows per vehicle)",
            max_rows_per_vehicle
        );
        Self {
            rows: Mutex::new(HashMap::new()),
            max_rows_per_vehicle: max_rows_per_vehicle.max(1),
        }
    }

    /// Append one sample for a motorcycle
    pub fn insert(&self, motorcycle_id: &str, row: SampleRow) -> Result<(), SourceError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| SourceError::DatabaseError(format!("Lock error: {}", e)))?;

        let log = rows.entry(motorcycle_id.to_string()).or_default();

        // Enforce retention
        while log.len() >= self.max_rows_per_vehicle {
            log.pop_front();
        }

        log.push_back(row);
        debug!("Stored sample for {} ({} rows)", motorcycle_id, log.len());
        Ok(())
    }

    /// Most recent sample for a motorcycle
    pub fn latest(&self, motorcycle_id: &str) -> Result<SampleRow, SourceError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| SourceError::DatabaseError(format!("Lock error: {}", e)))?;

        rows.get(motorcycle_id)
            .and_then(|log| log.iter().max_by_key(|r| r.timestamp))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(motorcycle_id.to_string()))
    }

    /// Rows at or after `since`, ascending by timestamp
    pub fn fetch_since(
        &self,
        motorcycle_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SampleRow>, SourceError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| SourceError::DatabaseError(format!("Lock error: {}", e)))?;

        let mut window: Vec<SampleRow> = rows
            .get(motorcycle_id)
            .map(|log| log.iter().filter(|r| r.timestamp >= since).cloned().collect())
            .unwrap_or_default();
        window.sort_by_key(|r| r.timestamp);
        Ok(window)
    }

    /// Number of rows stored for a motorcycle
    pub fn count(&self, motorcycle_id: &str) -> usize {
        self.rows
            .lock()
            .map(|rows| rows.get(motorcycle_id).map_or(0, |log| log.len()))
            .unwrap_or(0)
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSource for Repository {
    fn fetch(&self, motorcycle_id: &str, minutes: u32) -> Result<Vec<SampleRow>, SourceError> {
        if minutes == 0 {
            return Err(SourceError::InvalidWindow(minutes));
        }
        let since = Utc::now() - Duration::minutes(i64::from(minutes));
        self.fetch_since(motorcycle_id, since)
    }
}

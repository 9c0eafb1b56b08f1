//! Window source abstraction

use crate::SourceError;
use telemetry::SampleRow;

/// Supplies the recent telemetry window for a motorcycle
pub trait WindowSource: Send + Sync {
    /// Rows from the last `minutes` minutes, ascending by timestamp
    fn fetch(&self, motorcycle_id: &str, minutes: u32) -> Result<Vec<SampleRow>, SourceError>;
}

/// Fixed set of rows, returned as-is regardless of vehicle or window length
#[derive(Debug, Clone, Default)]
pub struct StaticWindow {
    rows: Vec<SampleRow>,
}

impl StaticWindow {
    pub fn new(mut rows: Vec<SampleRow>) -> Self {
        rows.sort_by_key(|r| r.timestamp);
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl WindowSource for StaticWindow {
    fn fetch(&self, _motorcycle_id: &str, _minutes: u32) -> Result<Vec<SampleRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_static_window_sorted() {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let rows = vec![
            SampleRow::new(base + Duration::seconds(10)),
            SampleRow::new(base),
        ];
        let window = StaticWindow::new(rows);

        let fetched = window.fetch("any", 1).unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].timestamp, base);
    }
}

//! Period summaries
//!
//! Per-channel means over the last day or week, read straight from the
//! window source without cleaning.

use feature_engine::StatisticalFeatures;
use serde::{Deserialize, Serialize};
use severity::round2;
use std::collections::BTreeMap;
use storage::{SourceError, WindowSource};
use telemetry::Channel;
use tracing::debug;

/// Reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
}

impl Period {
    /// Window length in minutes
    pub fn minutes(&self) -> u32 {
        match self {
            Period::Daily => 24 * 60,
            Period::Weekly => 7 * 24 * 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
        }
    }
}

/// Channel → mean (2 dp), `None` for channels without data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChannelMeans(BTreeMap<Channel, Option<f64>>);

impl ChannelMeans {
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.0.get(&channel).copied().flatten()
    }
}

/// Mean of every channel over the period
pub fn channel_means(
    source: &dyn WindowSource,
    motorcycle_id: &str,
    period: Period,
) -> Result<ChannelMeans, SourceError> {
    let rows = source.fetch(motorcycle_id, period.minutes())?;
    debug!("{} summary for {} over {} rows", period.as_str(), motorcycle_id, rows.len());

    Ok(ChannelMeans(
        Channel::ALL
            .iter()
            .map(|&channel| {
                let mean = StatisticalFeatures::channel_mean(&rows, channel).map(round2);
                (channel, mean)
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use storage::StaticWindow;
    use telemetry::SampleRow;

    #[test]
    fn test_period_lengths() {
        assert_eq!(Period::Daily.minutes(), 1440);
        assert_eq!(Period::Weekly.minutes(), 10080);
    }

    #[test]
    fn test_means_rounded_and_null_when_missing() {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let rows = vec![
            SampleRow::new(base).with(Channel::Rpm, 1500.0).with(Channel::CoolantTemp, 85.0),
            SampleRow::new(base + Duration::seconds(5))
                .with(Channel::Rpm, 1501.0)
                .with(Channel::CoolantTemp, 86.0),
            SampleRow::new(base + Duration::seconds(10)).with(Channel::Rpm, 1501.0),
        ];

        let means = channel_means(&StaticWindow::new(rows), "mc-1", Period::Daily).unwrap();
        assert_eq!(means.get(Channel::Rpm), Some(1500.67));
        assert_eq!(means.get(Channel::CoolantTemp), Some(85.5));
        assert_eq!(means.get(Channel::ElmVoltage), None);

        let json = serde_json::to_value(&means).unwrap();
        assert!(json["elm_voltage"].is_null());
        assert_eq!(json["coolant_temp"], 85.5);
    }
}

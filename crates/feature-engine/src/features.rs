//! Feature Vector Assembly
//!
//! Layout: [mean x6, std x6, max x6, min x6], channels in canonical order,
//! all computed in scaled space. Models are fitted against exactly this
//! layout, so any reordering silently corrupts inference.

use crate::scaling::{ChannelRow, Transformer};
use crate::statistics::StatisticalFeatures;
use crate::FeatureError;
use serde::{Deserialize, Serialize};
use telemetry::{Channel, SampleRow, CHANNEL_COUNT};
use tracing::debug;

/// Statistics per channel in the vector
pub const STATS_PER_CHANNEL: usize = 4;

/// Number of features in the vector (4 stats x 6 channels)
pub const FEATURE_DIMENSION: usize = STATS_PER_CHANNEL * CHANNEL_COUNT;

/// Statistic blocks, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Std,
    Max,
    Min,
}

impl Statistic {
    /// All statistic blocks in vector order
    pub const ALL: [Statistic; STATS_PER_CHANNEL] =
        [Statistic::Mean, Statistic::Std, Statistic::Max, Statistic::Min];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Max => "max",
            Statistic::Min => "min",
        }
    }

    /// Position of a (statistic, channel) pair in the vector
    pub fn offset(&self, channel: Channel) -> usize {
        (*self as usize) * CHANNEL_COUNT + channel.index()
    }
}

/// Names of every vector slot, e.g. `rpm_mean`, in vector order
pub fn feature_names() -> Vec<String> {
    Statistic::ALL
        .iter()
        .flat_map(|stat| Channel::ALL.iter().map(move |c| format!("{}_{}", c, stat.as_str())))
        .collect()
}

/// Aggregated window summary fed to the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw feature values (24 dimensions)
    pub values: [f64; FEATURE_DIMENSION],
    /// Rows aggregated
    pub window_rows: usize,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_DIMENSION],
            window_rows: 0,
        }
    }
}

impl FeatureVector {
    /// Read one slot
    pub fn get(&self, stat: Statistic, channel: Channel) -> f64 {
        self.values[stat.offset(channel)]
    }

    /// All slots in vector order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Window aggregator
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAggregator;

impl FeatureAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self
    }

    /// Fill missing values with the channel's window mean so every row is
    /// complete before scaling
    fn complete_rows(&self, rows: &[SampleRow]) -> Result<Vec<ChannelRow>, FeatureError> {
        let mut fill = [0.0; CHANNEL_COUNT];
        for channel in Channel::ALL {
            fill[channel.index()] = StatisticalFeatures::channel_mean(rows, channel)
                .ok_or(FeatureError::EmptyChannel(channel))?;
        }

        Ok(rows
            .iter()
            .map(|row| {
                let values = row.values();
                std::array::from_fn(|i| values[i].unwrap_or(fill[i]))
            })
            .collect())
    }

    /// Scale the window and summarise it into the fixed-layout vector
    pub fn aggregate(
        &self,
        rows: &[SampleRow],
        scaler: &dyn Transformer,
    ) -> Result<FeatureVector, FeatureError> {
        if rows.is_empty() {
            return Err(FeatureError::EmptyWindow);
        }

        let complete = self.complete_rows(rows)?;
        let scaled = scaler.transform(&complete);
        if scaled.len() != complete.len() {
            return Err(FeatureError::ScalerOutput {
                expected: complete.len(),
                actual: scaled.len(),
            });
        }

        let mut values = [0.0; FEATURE_DIMENSION];
        for channel in Channel::ALL {
            let column: Vec<f64> = scaled.iter().map(|row| row[channel.index()]).collect();
            let stats = StatisticalFeatures::compute(&column);
            values[Statistic::Mean.offset(channel)] = stats.mean;
            values[Statistic::Std.offset(channel)] = stats.std_dev;
            values[Statistic::Max.offset(channel)] = stats.max;
            values[Statistic::Min.offset(channel)] = stats.min;
        }

        debug!("Aggregated {} rows into {} features", rows.len(), FEATURE_DIMENSION);

        Ok(FeatureVector {
            values,
            window_rows: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::Identity;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn window(n: usize) -> Vec<SampleRow> {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let i = i as f64;
                SampleRow::from_values(
                    base + Duration::seconds(i as i64 * 5),
                    [1450.0 + i, 20.0, 2.5, -1.0 + 0.1 * i, 85.0 + 0.2 * i, 13.8],
                )
            })
            .collect()
    }

    /// Doubles every value, to prove stats are computed after scaling
    struct Doubler;

    impl Transformer for Doubler {
        fn transform(&self, rows: &[ChannelRow]) -> Vec<ChannelRow> {
            rows.iter().map(|r| r.map(|v| v * 2.0)).collect()
        }
    }

    #[test]
    fn test_layout_names() {
        let names = feature_names();
        assert_eq!(names.len(), FEATURE_DIMENSION);
        assert_eq!(names[0], "rpm_mean");
        assert_eq!(names[5], "elm_voltage_mean");
        assert_eq!(names[6], "rpm_std");
        assert_eq!(names[12], "rpm_max");
        assert_eq!(names[23], "elm_voltage_min");
    }

    #[test]
    fn test_aggregate_layout() {
        let rows = window(30);
        let vector = FeatureAggregator::new().aggregate(&rows, &Identity).unwrap();

        assert_eq!(vector.window_rows, 30);
        assert!((vector.get(Statistic::Mean, Channel::Rpm) - 1464.5).abs() < 1e-9);
        assert_eq!(vector.get(Statistic::Max, Channel::Rpm), 1479.0);
        assert_eq!(vector.get(Statistic::Min, Channel::Rpm), 1450.0);
        assert!(vector.get(Statistic::Std, Channel::ElmVoltage).abs() < 1e-9);
        assert_eq!(
            vector.values[Statistic::Mean.offset(Channel::CoolantTemp)],
            vector.get(Statistic::Mean, Channel::CoolantTemp)
        );
    }

    #[test]
    fn test_statistics_use_scaled_values() {
        let rows = window(30);
        let raw = FeatureAggregator::new().aggregate(&rows, &Identity).unwrap();
        let scaled = FeatureAggregator::new().aggregate(&rows, &Doubler).unwrap();
        for (r, s) in raw.values.iter().zip(scaled.values.iter()) {
            assert!((s - 2.0 * r).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_values_filled_with_channel_mean() {
        let mut rows = window(3);
        rows[1].set(Channel::ThrottlePos, None);
        let vector = FeatureAggregator::new().aggregate(&rows, &Identity).unwrap();
        assert_eq!(vector.get(Statistic::Mean, Channel::ThrottlePos), 2.5);
        assert_eq!(vector.get(Statistic::Std, Channel::ThrottlePos), 0.0);
    }

    #[test]
    fn test_empty_channel_is_an_error() {
        let mut rows = window(5);
        for row in &mut rows {
            row.set(Channel::ElmVoltage, None);
        }
        let err = FeatureAggregator::new().aggregate(&rows, &Identity).unwrap_err();
        assert!(matches!(err, FeatureError::EmptyChannel(Channel::ElmVoltage)));
        assert!(matches!(
            FeatureAggregator::new().aggregate(&[], &Identity),
            Err(FeatureError::EmptyWindow)
        ));
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_deterministic(
            raw in proptest::collection::vec(proptest::array::uniform6(-100.0f64..5000.0), 1..80)
        ) {
            let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
            let rows: Vec<_> = raw
                .into_iter()
                .enumerate()
                .map(|(i, v)| SampleRow::from_values(base + Duration::seconds(i as i64), v))
                .collect();

            let aggregator = FeatureAggregator::new();
            let first = aggregator.aggregate(&rows, &Doubler).unwrap();
            let second = aggregator.aggregate(&rows, &Doubler).unwrap();
            for (a, b) in first.values.iter().zip(second.values.iter()) {
                prop_assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }
}

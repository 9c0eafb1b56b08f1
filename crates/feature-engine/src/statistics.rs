//! Statistical Features Computation

use telemetry::{Channel, SampleRow};

/// Summary statistics for one channel over a window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticalFeatures {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        // Mean
        let mean = values.iter().sum::<f64>() / n;

        // Min/Max
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Population variance (ddof = 0), matching how models are fit
        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Present values of one channel, skipping rows where it is missing
    pub fn extract(rows: &[SampleRow], channel: Channel) -> Vec<f64> {
        rows.iter().filter_map(|r| r.get(channel)).collect()
    }

    /// Mean of the present values of one channel, `None` if it never reported
    pub fn channel_mean(rows: &[SampleRow], channel: Channel) -> Option<f64> {
        let values = Self::extract(rows, channel);
        if values.is_empty() {
            None
        } else {
            Some(Self::compute(&values).mean)
        }
    }
}

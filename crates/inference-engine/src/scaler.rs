//! Standardization scaler fitted offline

use feature_engine::{ChannelRow, Transformer};
use serde::{Deserialize, Serialize};
use telemetry::CHANNEL_COUNT;

/// Per-channel affine transform `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check the fitted parameters cover every channel; a zero scale is
    /// treated as 1 (constant channel during fitting)
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.len() != CHANNEL_COUNT || self.scale.len() != CHANNEL_COUNT {
            return Err(format!(
                "scaler expects {} channels, got mean={} scale={}",
                CHANNEL_COUNT,
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    fn scale_at(&self, i: usize) -> f64 {
        if self.scale[i] == 0.0 {
            1.0
        } else {
            self.scale[i]
        }
    }
}

impl Transformer for StandardScaler {
    fn transform(&self, rows: &[ChannelRow]) -> Vec<ChannelRow> {
        rows.iter()
            .map(|row| std::array::from_fn(|i| (row[i] - self.mean[i]) / self.scale_at(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_each_channel() {
        let scaler = StandardScaler {
            mean: vec![1500.0, 20.0, 2.0, 0.0, 85.0, 13.8],
            scale: vec![50.0, 2.0, 0.5, 1.0, 5.0, 0.0],
        };
        assert!(scaler.validate().is_ok());

        let out = scaler.transform(&[[1550.0, 18.0, 2.0, -1.0, 95.0, 14.0]]);
        assert_eq!(out.len(), 1);
        assert!((out[0][0] - 1.0).abs() < 1e-12);
        assert!((out[0][1] + 1.0).abs() < 1e-12);
        assert_eq!(out[0][2], 0.0);
        assert_eq!(out[0][3], -1.0);
        assert!((out[0][4] - 2.0).abs() < 1e-12);
        // zero scale falls back to 1
        assert!((out[0][5] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let scaler = StandardScaler {
            mean: vec![0.0; 5],
            scale: vec![1.0; 6],
        };
        assert!(scaler.validate().is_err());
    }
}

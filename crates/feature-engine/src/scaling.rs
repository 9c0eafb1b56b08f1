//! Per-row scaling applied before aggregation

use telemetry::CHANNEL_COUNT;

/// One complete row of channel values in canonical order
pub type ChannelRow = [f64; CHANNEL_COUNT];

/// Per-feature transform fitted offline (e.g. standardization)
pub trait Transformer: Send + Sync {
    /// Transform rows; output has the same length and order as the input
    fn transform(&self, rows: &[ChannelRow]) -> Vec<ChannelRow>;
}

/// Pass-through transform
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transformer for Identity {
    fn transform(&self, rows: &[ChannelRow]) -> Vec<ChannelRow> {
        rows.to_vec()
    }
}

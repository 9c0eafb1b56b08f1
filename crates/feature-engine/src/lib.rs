//! Feature Engineering Engine
//!
//! Scales a cleaned telemetry window and aggregates it into the 24-dimension
//! statistical vector consumed by the per-vehicle outlier detector.

mod features;
mod scaling;
mod statistics;

pub use features::{
    feature_names, FeatureAggregator, FeatureVector, Statistic, FEATURE_DIMENSION,
    STATS_PER_CHANNEL,
};
pub use scaling::{ChannelRow, Identity, Transformer};
pub use statistics::StatisticalFeatures;

use telemetry::Channel;
use thiserror::Error;

/// Errors during feature aggregation
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("cannot aggregate an empty window")]
    EmptyWindow,
    #[error("channel {0} has no values in the window")]
    EmptyChannel(Channel),
    #[error("scaler returned {actual} rows for {expected} inputs")]
    ScalerOutput { expected: usize, actual: usize },
}

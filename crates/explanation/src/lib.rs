//! Explanation Synthesizer
//!
//! Turns window means into human-readable findings: classification, severity
//! score, and a maintenance tip chosen by the direction of the deviation.

mod catalog;
mod synthesizer;

pub use catalog::{tips, ChannelTips};
pub use synthesizer::{abnormal_features, banner, Direction, Explanation, ExplanationSynthesizer};

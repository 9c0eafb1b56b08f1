//! Idle Telemetry Model
//!
//! Sample rows collected from the OBD-II adapter and the fixed channel
//! catalog shared by every stage of the diagnostics pipeline.

mod channel;
mod keys;
mod row;

pub use channel::{Channel, UnknownChannel, CHANNEL_COUNT};
pub use keys::normalize_key;
pub use row::{ChannelValues, SampleRow};

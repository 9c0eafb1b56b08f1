//! Sample Rows

use crate::channel::{Channel, CHANNEL_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel values of one row in canonical order, `None` where the PID
/// returned no data
pub type ChannelValues = [Option<f64>; CHANNEL_COUNT];

/// One telemetry sample as stored and queried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    /// Sample time (UTC)
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub engine_load: Option<f64>,
    #[serde(default)]
    pub throttle_pos: Option<f64>,
    #[serde(default)]
    pub long_fuel_trim_1: Option<f64>,
    #[serde(default)]
    pub coolant_temp: Option<f64>,
    #[serde(default)]
    pub elm_voltage: Option<f64>,
}

impl SampleRow {
    /// Create an empty row at the given time
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            rpm: None,
            engine_load: None,
            throttle_pos: None,
            long_fuel_trim_1: None,
            coolant_temp: None,
            elm_voltage: None,
        }
    }

    /// Create a row with every channel populated from `values` (canonical order)
    pub fn from_values(timestamp: DateTime<Utc>, values: [f64; CHANNEL_COUNT]) -> Self {
        let mut row = Self::new(timestamp);
        for (channel, value) in Channel::ALL.iter().zip(values) {
            row.set(*channel, Some(value));
        }
        row
    }

    /// Builder-style setter
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        self.set(channel, Some(value));
        self
    }

    /// Read a single channel
    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Rpm => self.rpm,
            Channel::EngineLoad => self.engine_load,
            Channel::ThrottlePos => self.throttle_pos,
            Channel::LongFuelTrim1 => self.long_fuel_trim_1,
            Channel::CoolantTemp => self.coolant_temp,
            Channel::ElmVoltage => self.elm_voltage,
        }
    }

    /// Write a single channel
    pub fn set(&mut self, channel: Channel, value: Option<f64>) {
        let slot = match channel {
            Channel::Rpm => &mut self.rpm,
            Channel::EngineLoad => &mut self.engine_load,
            Channel::ThrottlePos => &mut self.throttle_pos,
            Channel::LongFuelTrim1 => &mut self.long_fuel_trim_1,
            Channel::CoolantTemp => &mut self.coolant_temp,
            Channel::ElmVoltage => &mut self.elm_voltage,
        };
        *slot = value;
    }

    /// All channels in canonical order
    pub fn values(&self) -> ChannelValues {
        Channel::ALL.map(|c| self.get(c))
    }

    /// Number of channels carrying a value
    pub fn present_count(&self) -> usize {
        self.values().iter().filter(|v| v.is_some()).count()
    }

    /// True when all six channels read exactly zero, which is how the
    /// adapter reports a dropped connection. A missing channel is not zero.
    pub fn is_dropout(&self) -> bool {
        self.values().iter().all(|v| *v == Some(0.0))
    }
}

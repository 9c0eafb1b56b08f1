//! Channel Catalog
//!
//! The six OBD-II channels sampled at idle. Their declaration order is the
//! canonical feature order used when fitting and applying models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of channels per sample row
pub const CHANNEL_COUNT: usize = 6;

/// OBD-II channel captured in each telemetry row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Engine RPM (PID 0x0C)
    #[serde(rename = "rpm")]
    Rpm,
    /// Calculated engine load, % (PID 0x04)
    #[serde(rename = "engine_load")]
    EngineLoad,
    /// Throttle position, % (PID 0x11)
    #[serde(rename = "throttle_pos")]
    ThrottlePos,
    /// Long-term fuel trim bank 1, % (PID 0x07)
    #[serde(rename = "long_fuel_trim_1")]
    LongFuelTrim1,
    /// Engine coolant temperature, °C (PID 0x05)
    #[serde(rename = "coolant_temp")]
    CoolantTemp,
    /// Adapter-reported battery voltage, V
    #[serde(rename = "elm_voltage")]
    ElmVoltage,
}

impl Channel {
    /// All channels in canonical order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Rpm,
        Channel::EngineLoad,
        Channel::ThrottlePos,
        Channel::LongFuelTrim1,
        Channel::CoolantTemp,
        Channel::ElmVoltage,
    ];

    /// Field name used in storage, reference tables and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Rpm => "rpm",
            Channel::EngineLoad => "engine_load",
            Channel::ThrottlePos => "throttle_pos",
            Channel::LongFuelTrim1 => "long_fuel_trim_1",
            Channel::CoolantTemp => "coolant_temp",
            Channel::ElmVoltage => "elm_voltage",
        }
    }

    /// Position of this channel in a row
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Rpm => "rpm",
            Channel::EngineLoad | Channel::ThrottlePos | Channel::LongFuelTrim1 => "%",
            Channel::CoolantTemp => "°C",
            Channel::ElmVoltage => "V",
        }
    }

    /// Trim channels are centered on zero: positive means the ECU is adding
    /// fuel, negative means it is pulling fuel.
    pub fn is_zero_centered(&self) -> bool {
        matches!(self, Channel::LongFuelTrim1)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name outside the channel catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or(UnknownChannel(s.to_string()))
    }
}

//! Maintenance tip catalog

use telemetry::Channel;

/// Plain-language description and tips for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTips {
    pub description: &'static str,
    pub high_tip: &'static str,
    pub low_tip: &'static str,
}

/// Look up the catalog entry for a channel
pub fn tips(channel: Channel) -> ChannelTips {
    match channel {
        Channel::Rpm => ChannelTips {
            description: "Engine speed at idle",
            high_tip: "Idle speed is high; check for vacuum leaks, a sticking throttle body, or the idle air control valve",
            low_tip: "Idle speed is low; clean the throttle body and check spark plugs and air filter",
        },
        Channel::EngineLoad => ChannelTips {
            description: "Calculated engine load",
            high_tip: "Engine is working hard at idle; check for dragging brakes, a clogged air filter, or a tight drivetrain",
            low_tip: "Engine load is unusually low; check the MAP/TPS sensors and intake for leaks",
        },
        Channel::ThrottlePos => ChannelTips {
            description: "Throttle plate opening",
            high_tip: "Throttle is open at idle; check cable free play and the throttle position sensor",
            low_tip: "Throttle reading is below its rest position; recalibrate or inspect the throttle position sensor",
        },
        Channel::LongFuelTrim1 => ChannelTips {
            description: "Long-term fuel trim, bank 1",
            high_tip: "ECU is adding fuel (running lean); inspect for intake air leaks, a weak fuel pump, or clogged injectors",
            low_tip: "ECU is removing fuel (running rich); check the O2 sensor, injectors, and air filter",
        },
        Channel::CoolantTemp => ChannelTips {
            description: "Engine coolant temperature",
            high_tip: "Engine is running hot; check coolant level, radiator fan, and thermostat",
            low_tip: "Engine is running cold; the thermostat may be stuck open or the temperature sensor faulty",
        },
        Channel::ElmVoltage => ChannelTips {
            description: "Battery / charging system voltage",
            high_tip: "Charging voltage is too high; inspect the regulator/rectifier",
            low_tip: "Voltage is low; test the battery and charging system, and clean the terminals",
        },
    }
}

//! Route handlers

pub mod predict;
pub mod reports;
pub mod telemetry;

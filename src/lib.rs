//! Parallel Monte-Carlo simulator for the electrical load of an EV charging fleet.

pub mod config;
pub mod error;
pub mod io;
/// Tick loop, charger model, parallel orchestration, and aggregation.
pub mod sim;
pub mod sweep;

#[cfg(feature = "api")]
pub mod api;

//! Client for the realtime device-telemetry store
//!
//! Device readings live under `devices/*` and are read-only here; alert
//! records are upserted under `alerts/{deviceId}`.

pub mod client;
pub mod model;

pub use client::{RestTelemetryClient, TelemetryError, TelemetryStore};
pub use model::{AlertRecord, DeviceRecord};

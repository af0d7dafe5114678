//! Aquamon: Aquarium Telemetry Monitor
//!
//! A pair of small services for aquarium monitoring: a poller that scans a
//! remote device-telemetry store for high pH readings and raises alerts, and
//! a notifier HTTP service that delivers the resulting push notifications
//! and logs them per user.
//!
//! # Features
//!
//! - **Change-Detection Alerting**: a device alerts when its pH rises above
//!   8.5 *and* the value differs from the last one seen, so an unchanged
//!   high reading stays quiet between polls
//! - **Non-Overlapping Poll Passes**: each pass runs to completion before
//!   the next tick is honored
//! - **Alert Records**: upserted per device in the telemetry store with a
//!   `handled` flag left for downstream consumers
//! - **Push Dispatch**: legacy FCM send API with high delivery priority
//! - **Notification Log**: append-only per-user audit trail in the document
//!   store
//!
//! # Example
//!
//! ```no_run
//! use aquamon::monitor::{HttpDispatcher, PhMonitor};
//! use aquamon::telemetry::RestTelemetryClient;
//!
//! # async fn run() {
//! let telemetry = RestTelemetryClient::new("http://db.local", None);
//! let dispatcher = HttpDispatcher::new("http://localhost:8080/notify", None);
//!
//! let mut monitor = PhMonitor::new();
//! let report = monitor.run_cycle(&telemetry, &dispatcher).await.unwrap();
//! println!("dispatched {} alerts", report.alerts_dispatched);
//! # }
//! ```

pub mod api;
pub mod config;
pub mod monitor;
pub mod push;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use config::{NotifierConfig, PollerConfig};
pub use monitor::{PhMonitor, PollWorker, HIGH_PH_THRESHOLD};
pub use telemetry::{AlertRecord, DeviceRecord};

//! Change-detection alerting loop
//!
//! Polls the telemetry store on a fixed interval, detects newly-high pH
//! readings per device, upserts alert records, and dispatches notification
//! requests to the notifier service.

pub mod dispatch;
pub mod watcher;
pub mod worker;

pub use dispatch::{AlertDispatcher, DispatchError, HighPhAlert, HttpDispatcher};
pub use watcher::{CycleReport, PhMonitor, HIGH_PH_THRESHOLD};
pub use worker::{PollWorker, PollerStatus};

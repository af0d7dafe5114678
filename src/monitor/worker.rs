//! Interval-driven poll worker

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::{self, MissedTickBehavior};

use crate::telemetry::TelemetryStore;

use super::dispatch::AlertDispatcher;
use super::watcher::PhMonitor;

/// Counters exposed on the liveness listener's `/status` endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollerStatus {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub alerts_dispatched: u64,
    pub devices_seen: usize,
    /// RFC 3339 timestamp of the last completed pass
    pub last_cycle_at: Option<String>,
}

/// Background worker that runs poll passes on a fixed interval
///
/// Passes never overlap: each one is awaited to completion inside the tick
/// loop, and `MissedTickBehavior::Delay` pushes ticks back rather than
/// stacking them when a pass outruns the interval.
pub struct PollWorker {
    telemetry: Arc<dyn TelemetryStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
    interval: Duration,
    running: Arc<AtomicBool>,
    status: Arc<RwLock<PollerStatus>>,
}

impl PollWorker {
    pub fn new(
        telemetry: Arc<dyn TelemetryStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
        interval: Duration,
    ) -> Self {
        Self {
            telemetry,
            dispatcher,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(RwLock::new(PollerStatus::default())),
        }
    }

    /// Shared handle to the status counters
    pub fn status(&self) -> Arc<RwLock<PollerStatus>> {
        Arc::clone(&self.status)
    }

    /// Start the background worker
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            tracing::info!("Poll worker started with interval {:?}", self.interval);

            // The cache lives with this task; restarts start empty and
            // re-alert once for readings that are still high.
            let mut monitor = PhMonitor::new();

            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while self.running.load(Ordering::SeqCst) {
                ticker.tick().await;

                match monitor
                    .run_cycle(self.telemetry.as_ref(), self.dispatcher.as_ref())
                    .await
                {
                    Ok(report) => {
                        let mut status = self.status.write();
                        status.cycles_completed += 1;
                        status.alerts_dispatched += report.alerts_dispatched as u64;
                        status.devices_seen = report.devices_seen;
                        status.last_cycle_at = Some(chrono::Utc::now().to_rfc3339());
                    }
                    Err(e) => {
                        self.status.write().cycles_failed += 1;
                        tracing::error!(error = %e, "Poll cycle failed");
                    }
                }
            }

            tracing::info!("Poll worker stopped");
        })
    }

    /// Stop the worker
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if worker is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::dispatch::{DispatchError, HighPhAlert};
    use crate::telemetry::{AlertRecord, DeviceRecord, TelemetryError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct EmptyTelemetry;

    #[async_trait]
    impl TelemetryStore for EmptyTelemetry {
        async fn fetch_devices(&self) -> Result<HashMap<String, DeviceRecord>, TelemetryError> {
            Ok(HashMap::new())
        }

        async fn put_alert(&self, _: &str, _: &AlertRecord) -> Result<(), TelemetryError> {
            Ok(())
        }
    }

    struct NoopDispatcher;

    #[async_trait]
    impl AlertDispatcher for NoopDispatcher {
        async fn dispatch(&self, _: &HighPhAlert) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_worker_runs_cycles_until_stopped() {
        let worker = Arc::new(PollWorker::new(
            Arc::new(EmptyTelemetry),
            Arc::new(NoopDispatcher),
            Duration::from_millis(10),
        ));
        let status = worker.status();

        let handle = Arc::clone(&worker).start();
        assert!(worker.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        worker.stop();
        assert!(!worker.is_running());

        let completed = status.read().cycles_completed;
        assert!(completed >= 1);
        assert_eq!(status.read().cycles_failed, 0);

        handle.abort();
    }

    struct FailingTelemetry;

    #[async_trait]
    impl TelemetryStore for FailingTelemetry {
        async fn fetch_devices(&self) -> Result<HashMap<String, DeviceRecord>, TelemetryError> {
            Err(TelemetryError::Network("unreachable".to_string()))
        }

        async fn put_alert(&self, _: &str, _: &AlertRecord) -> Result<(), TelemetryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cycle_errors_do_not_stop_the_worker() {
        let worker = Arc::new(PollWorker::new(
            Arc::new(FailingTelemetry),
            Arc::new(NoopDispatcher),
            Duration::from_millis(10),
        ));
        let status = worker.status();

        let handle = Arc::clone(&worker).start();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Multiple failures recorded means the timer kept firing
        assert!(status.read().cycles_failed >= 2);
        assert!(worker.is_running());

        worker.stop();
        handle.abort();
    }
}

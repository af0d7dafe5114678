//! High-pH change detection

use std::collections::HashMap;

use crate::telemetry::{AlertRecord, TelemetryError, TelemetryStore};

use super::dispatch::{AlertDispatcher, HighPhAlert};

/// Readings must exceed this to alert (exclusive)
pub const HIGH_PH_THRESHOLD: f64 = 8.5;

/// Per-device change detector
///
/// Owns the last-seen cache for the poller task. The cache starts empty, so
/// a restarted process re-alerts once for an already-high reading; that
/// staleness is accepted, and nothing deduplicates across processes.
#[derive(Debug, Default)]
pub struct PhMonitor {
    last_seen: HashMap<String, f64>,
}

/// Outcome of a single poll pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleReport {
    pub devices_seen: usize,
    pub alerts_dispatched: usize,
}

impl PhMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the reading is above threshold and differs from (or is
    /// absent from) the last-seen value for this device. A change between
    /// two above-threshold values still fires.
    pub fn should_alert(&self, device_id: &str, ph_level: f64) -> bool {
        ph_level > HIGH_PH_THRESHOLD && self.last_seen.get(device_id) != Some(&ph_level)
    }

    /// Record the latest reading, alert or not
    pub fn observe(&mut self, device_id: &str, ph_level: f64) {
        self.last_seen.insert(device_id.to_string(), ph_level);
    }

    /// Number of devices currently tracked
    pub fn tracked_devices(&self) -> usize {
        self.last_seen.len()
    }

    /// One fetch-and-evaluate pass over the device snapshot
    ///
    /// Devices missing a measurement or owner are skipped silently. A failed
    /// alert write leaves the cache untouched for that device so the change
    /// rule re-fires on the next pass; a failed dispatch does not (the
    /// notification is not retried). Snapshot iteration order is
    /// unspecified.
    pub async fn run_cycle(
        &mut self,
        telemetry: &dyn TelemetryStore,
        dispatcher: &dyn AlertDispatcher,
    ) -> Result<CycleReport, TelemetryError> {
        let devices = telemetry.fetch_devices().await?;
        let mut report = CycleReport {
            devices_seen: devices.len(),
            ..CycleReport::default()
        };

        for (device_id, device) in &devices {
            let Some(ph_level) = device.ph_level() else {
                continue;
            };
            let Some(user_id) = device.user_id() else {
                continue;
            };

            if self.should_alert(device_id, ph_level) {
                tracing::warn!(
                    device_id = %device_id,
                    user_id = %user_id,
                    ph_level,
                    "High pH detected"
                );

                let record = AlertRecord::new(user_id, device_id.as_str(), ph_level);
                if let Err(e) = telemetry.put_alert(device_id, &record).await {
                    tracing::error!(
                        device_id = %device_id,
                        error = %e,
                        "Failed to write alert record"
                    );
                    continue;
                }

                let alert = HighPhAlert {
                    user_id: user_id.to_string(),
                    device_id: device_id.clone(),
                    ph_level,
                };
                match dispatcher.dispatch(&alert).await {
                    Ok(()) => {
                        report.alerts_dispatched += 1;
                        tracing::info!(device_id = %device_id, "Notification dispatched");
                    }
                    Err(e) => {
                        tracing::error!(
                            device_id = %device_id,
                            error = %e,
                            "Notification dispatch failed"
                        );
                    }
                }
            }

            self.observe(device_id, ph_level);
        }

        Ok(report)
    }
}

//! Wire models for the telemetry store

use serde::{Deserialize, Serialize};

/// A device entry as stored under `devices/{deviceId}`
///
/// Both the nested measurement and the owning user can be absent on
/// partially-provisioned devices; callers skip such entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub data: Option<DeviceData>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceData {
    #[serde(default)]
    pub phlevel: Option<PhReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhReading {
    #[serde(rename = "pHLevel", default)]
    pub ph_level: Option<f64>,
}

impl DeviceRecord {
    /// The latest pH measurement, if the device has reported one
    pub fn ph_level(&self) -> Option<f64> {
        self.data.as_ref()?.phlevel.as_ref()?.ph_level
    }

    /// The owning user, if assigned
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// An alert record as written to `alerts/{deviceId}`
///
/// `handled` is always written false; transitioning it belongs to whatever
/// consumes the alert, never to this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "pHLevel")]
    pub ph_level: f64,
    /// RFC 3339 creation timestamp
    pub timestamp: String,
    pub handled: bool,
}

impl AlertRecord {
    pub fn new(user_id: impl Into<String>, device_id: impl Into<String>, ph_level: f64) -> Self {
        Self {
            user_id: user_id.into(),
            device_id: device_id.into(),
            ph_level,
            timestamp: chrono::Utc::now().to_rfc3339(),
            handled: false,
        }
    }
}

//! Wire types exchanged with the farm API.

use serde::{Deserialize, Serialize};

/// One timestamped sensor snapshot for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Per-device endpoints omit the id, so it falls back to empty.
    #[serde(default)]
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub battery_level: f64,
    pub timestamp: String,
}

/// A registered field device, as mirrored from the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub mac_address: String,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "offline".to_string()
}

/// Body of `POST /api/devices/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub device_id: String,
    pub mac_address: String,
}

/// Response of a firmware deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub ota_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub temperature: TemperatureRange,
    pub condition: String,
    pub icon: String,
}

/// Current conditions plus a short forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
}

/// `GET /api/sensor-data` answers with a single reading on some deployments
/// and with a collection on others; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorSnapshot {
    Single(SensorReading),
    Collection(Vec<SensorReading>),
}

impl SensorSnapshot {
    /// The most recent reading in the snapshot, if any.
    ///
    /// Collections are served newest first, so the head wins.
    pub fn latest(&self) -> Option<&SensorReading> {
        match self {
            SensorSnapshot::Single(reading) => Some(reading),
            SensorSnapshot::Collection(readings) => readings.first(),
        }
    }

    pub fn readings(&self) -> Vec<&SensorReading> {
        match self {
            SensorSnapshot::Single(reading) => vec![reading],
            SensorSnapshot::Collection(readings) => readings.iter().collect(),
        }
    }
}

//! The polled endpoints of the farm API.

use super::Resource;
use crate::api::FarmApi;
use crate::api::client::{DEFAULT_READINGS_PATH, DEVICES_PATH, WEATHER_PATH, history_path, reading_path};
use crate::api::error::ApiError;
use crate::history::{HistorySeries, project};
use crate::model::{Device, SensorReading, SensorSnapshot, Weather};
use std::sync::Arc;

/// Latest reading of one device.
pub struct LatestReading {
    api: Arc<dyn FarmApi>,
    device_id: String,
}

impl LatestReading {
    pub fn new(api: Arc<dyn FarmApi>, device_id: impl Into<String>) -> Self {
        Self {
            api,
            device_id: device_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl Resource for LatestReading {
    type Output = SensorReading;

    fn name(&self) -> &str {
        "sensor"
    }

    fn path(&self) -> String {
        // Without a device there is nothing to address.
        if self.device_id.trim().is_empty() {
            return String::new();
        }
        reading_path(&self.device_id)
    }

    fn failure_message(&self) -> &str {
        "Failed to fetch sensor data"
    }

    async fn fetch(&self) -> Result<SensorReading, ApiError> {
        self.api.latest_reading(&self.device_id).await
    }
}

/// Windowed history of one device, projected for charting.
pub struct ReadingHistory {
    api: Arc<dyn FarmApi>,
    device_id: String,
    hours: u32,
}

impl ReadingHistory {
    pub fn new(api: Arc<dyn FarmApi>, device_id: impl Into<String>, hours: u32) -> Self {
        Self {
            api,
            device_id: device_id.into(),
            hours,
        }
    }
}

#[async_trait::async_trait]
impl Resource for ReadingHistory {
    type Output = HistorySeries;

    fn name(&self) -> &str {
        "history"
    }

    fn path(&self) -> String {
        if self.device_id.trim().is_empty() {
            return String::new();
        }
        history_path(&self.device_id, self.hours)
    }

    fn failure_message(&self) -> &str {
        "Failed to fetch historical data"
    }

    async fn fetch(&self) -> Result<HistorySeries, ApiError> {
        let readings = self.api.reading_history(&self.device_id, self.hours).await?;
        Ok(project(&readings))
    }
}

/// Readings from the default-device endpoint.
pub struct DefaultReadings {
    api: Arc<dyn FarmApi>,
}

impl DefaultReadings {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Resource for DefaultReadings {
    type Output = SensorSnapshot;

    fn name(&self) -> &str {
        "sensor-data"
    }

    fn path(&self) -> String {
        DEFAULT_READINGS_PATH.to_string()
    }

    fn failure_message(&self) -> &str {
        "Failed to fetch sensor data"
    }

    async fn fetch(&self) -> Result<SensorSnapshot, ApiError> {
        self.api.default_readings().await
    }
}

/// Every registered device.
pub struct DeviceList {
    api: Arc<dyn FarmApi>,
}

impl DeviceList {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Resource for DeviceList {
    type Output = Vec<Device>;

    fn name(&self) -> &str {
        "devices"
    }

    fn path(&self) -> String {
        DEVICES_PATH.to_string()
    }

    fn failure_message(&self) -> &str {
        "Failed to fetch devices"
    }

    async fn fetch(&self) -> Result<Vec<Device>, ApiError> {
        self.api.devices().await
    }
}

/// Farm weather and forecast.
pub struct WeatherReport {
    api: Arc<dyn FarmApi>,
}

impl WeatherReport {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Resource for WeatherReport {
    type Output = Weather;

    fn name(&self) -> &str {
        "weather"
    }

    fn path(&self) -> String {
        WEATHER_PATH.to_string()
    }

    fn failure_message(&self) -> &str {
        "Failed to load weather data"
    }

    async fn fetch(&self) -> Result<Weather, ApiError> {
        self.api.weather().await
    }
}

use crate::api::error::ApiError;
use crate::model::{Device, DeviceRegistration, Deployment, SensorReading, SensorSnapshot, Weather};

pub(crate) mod client;
pub use client::FarmApiClient;
pub mod error;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FarmApi: Send + Sync {
    /// Base address every endpoint is resolved against.
    fn base_url(&self) -> &str;

    /// Latest reading for one device.
    async fn latest_reading(&self, device_id: &str) -> Result<SensorReading, ApiError>;

    /// Readings for one device over the last `hours` hours.
    async fn reading_history(
        &self,
        device_id: &str,
        hours: u32,
    ) -> Result<Vec<SensorReading>, ApiError>;

    /// Readings from the default-device endpoint.
    async fn default_readings(&self) -> Result<SensorSnapshot, ApiError>;

    /// Every device known to the API.
    async fn devices(&self) -> Result<Vec<Device>, ApiError>;

    /// Registers a new device.
    async fn register_device(&self, registration: &DeviceRegistration) -> Result<(), ApiError>;

    /// Starts a firmware rollout for a device and returns where it can fetch the image.
    async fn deploy_firmware(&self, device_id: &str) -> Result<Deployment, ApiError>;

    /// Current weather and forecast for the farm.
    async fn weather(&self) -> Result<Weather, ApiError>;
}

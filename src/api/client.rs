//! Farm API Client
//!
//! A JSON-over-HTTP client for the farm monitoring backend.

use crate::api::FarmApi;
use crate::api::error::ApiError;
use crate::consts::cli_consts::http;
use crate::model::{Device, DeviceRegistration, Deployment, SensorReading, SensorSnapshot, Weather};
use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("farm-monitor/", env!("CARGO_PKG_VERSION"));

pub(crate) fn reading_path(device_id: &str) -> String {
    format!("api/sensor-data/{}", urlencoding::encode(device_id))
}

pub(crate) fn history_path(device_id: &str, hours: u32) -> String {
    format!(
        "api/sensor-data/{}/history?hours={}",
        urlencoding::encode(device_id),
        hours
    )
}

pub(crate) fn deploy_path(device_id: &str) -> String {
    format!("api/devices/{}/deploy", urlencoding::encode(device_id))
}

pub(crate) const DEFAULT_READINGS_PATH: &str = "api/sensor-data";
pub(crate) const DEVICES_PATH: &str = "api/devices";
pub(crate) const REGISTER_PATH: &str = "api/devices/register";
pub(crate) const WEATHER_PATH: &str = "api/weather";

#[derive(Debug, Clone)]
pub struct FarmApiClient {
    client: Client,
    base_url: String,
}

impl FarmApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(http::connect_timeout())
            .timeout(http::request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(ApiError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        let response = self.client.get(&url).send().await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn post_request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let response = self.post(endpoint, body).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn post_request_no_response<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.post(endpoint, body).await?;
        Ok(())
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::handle_response_status(response).await
    }
}

#[async_trait::async_trait]
impl FarmApi for FarmApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn latest_reading(&self, device_id: &str) -> Result<SensorReading, ApiError> {
        let mut reading: SensorReading = self.get_request(&reading_path(device_id)).await?;
        if reading.device_id.is_empty() {
            reading.device_id = device_id.to_string();
        }
        Ok(reading)
    }

    async fn reading_history(
        &self,
        device_id: &str,
        hours: u32,
    ) -> Result<Vec<SensorReading>, ApiError> {
        let mut readings: Vec<SensorReading> =
            self.get_request(&history_path(device_id, hours)).await?;
        for reading in readings.iter_mut().filter(|r| r.device_id.is_empty()) {
            reading.device_id = device_id.to_string();
        }
        Ok(readings)
    }

    async fn default_readings(&self) -> Result<SensorSnapshot, ApiError> {
        self.get_request(DEFAULT_READINGS_PATH).await
    }

    async fn devices(&self) -> Result<Vec<Device>, ApiError> {
        self.get_request(DEVICES_PATH).await
    }

    async fn register_device(&self, registration: &DeviceRegistration) -> Result<(), ApiError> {
        self.post_request_no_response(REGISTER_PATH, Some(registration))
            .await
    }

    async fn deploy_firmware(&self, device_id: &str) -> Result<Deployment, ApiError> {
        self.post_request::<(), _>(&deploy_path(device_id), None)
            .await
    }

    async fn weather(&self) -> Result<Weather, ApiError> {
        self.get_request(WEATHER_PATH).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorKind;

    #[test]
    fn test_build_url_joins_single_slash() {
        let client = FarmApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(
            client.build_url("/api/devices"),
            "http://localhost:5000/api/devices"
        );
    }

    #[test]
    // Device ids are used as path segments and must be encoded.
    fn test_paths_encode_device_id() {
        assert_eq!(reading_path("esp8266-01"), "api/sensor-data/esp8266-01");
        assert_eq!(
            history_path("field 2/north", 24),
            "api/sensor-data/field%202%2Fnorth/history?hours=24"
        );
        assert_eq!(deploy_path("a b"), "api/devices/a%20b/deploy");
    }

    #[test]
    fn test_decode_rejects_malformed_body() {
        let err = FarmApiClient::decode_response::<Vec<Device>>(b"<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    /// Address of a local port that was just released, so nothing listens on it.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    // The connection is refused, so the request fails before any response.
    async fn test_unreachable_server_is_network_error() {
        let client = FarmApiClient::new(closed_port_url()).unwrap();
        let err = client.devices().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}

//! Registering a new field device with the farm API.

use crate::api::FarmApi;
use crate::api::error::ApiError;
use crate::model::DeviceRegistration;
use crate::poller::Refresh;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Failed to register device: {0}")]
    Api(#[from] ApiError),
}

/// Pending registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub device_id: String,
    pub mac_address: String,
}

impl RegistrationForm {
    pub fn new(device_id: impl Into<String>, mac_address: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            mac_address: mac_address.into(),
        }
    }

    pub fn clear(&mut self) {
        self.device_id.clear();
        self.mac_address.clear();
    }

    fn to_request(&self) -> Result<DeviceRegistration, RegistrationError> {
        let device_id = self.device_id.trim();
        let mac_address = self.mac_address.trim();
        if device_id.is_empty() {
            return Err(RegistrationError::EmptyField("Device ID"));
        }
        if mac_address.is_empty() {
            return Err(RegistrationError::EmptyField("MAC address"));
        }
        Ok(DeviceRegistration {
            device_id: device_id.to_string(),
            mac_address: mac_address.to_string(),
        })
    }
}

/// Submits `form` and, on success, clears it and asks `devices` to refetch.
///
/// On failure the form is left as typed so it can be corrected and resent.
pub async fn submit(
    api: &dyn FarmApi,
    form: &mut RegistrationForm,
    devices: &dyn Refresh,
) -> Result<DeviceRegistration, RegistrationError> {
    let request = form.to_request()?;
    api.register_device(&request).await?;

    form.clear();
    devices.refresh();
    Ok(request)
}

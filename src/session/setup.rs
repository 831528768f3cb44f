//! Session setup and initialization

use crate::api::FarmApi;
use crate::consts::cli_consts::EVENT_QUEUE_SIZE;
use crate::events::{Event, EventSender};
use crate::history::HistorySeries;
use crate::model::{Device, SensorReading, Weather};
use crate::poller::resources::{DeviceList, LatestReading, ReadingHistory, WeatherReport};
use crate::poller::{Poller, PollerError, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// What a live session polls, and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub device_id: String,
    pub history_hours: u32,
    pub sensor_refresh: Duration,
    pub weather_refresh: Duration,
    pub with_weather: bool,
}

/// Subscriptions and channels of a running session
pub struct SessionData {
    /// Event receiver for poller events
    pub event_receiver: mpsc::Receiver<Event>,
    /// Shutdown sender to stop the session
    pub shutdown_sender: broadcast::Sender<()>,
    pub sensor: Subscription<SensorReading>,
    pub history: Subscription<HistorySeries>,
    pub devices: Subscription<Vec<Device>>,
    pub weather: Option<Subscription<Weather>>,
    pub options: WatchOptions,
    /// Base address the pollers resolve their paths against
    pub api_url: String,
}

impl SessionData {
    /// Stops every poller; nothing changes state after this returns.
    pub fn stop_all(&self) {
        self.sensor.stop();
        self.history.stop();
        self.devices.stop();
        if let Some(weather) = &self.weather {
            weather.stop();
        }
    }
}

/// Starts one poller per dashboard view, all reporting to a shared event channel.
///
/// # Arguments
/// * `api` - Farm API client shared by all pollers
/// * `options` - Device, window and cadence to poll with
///
/// # Returns
/// * `Ok(SessionData)` - Every poller is running
/// * `Err(PollerError)` - An interval or resource was rejected
pub fn setup_session(
    api: Arc<dyn FarmApi>,
    options: WatchOptions,
) -> Result<SessionData, PollerError> {
    let api_url = api.base_url().trim_end_matches('/').to_string();
    let (event_sender, event_receiver) = mpsc::channel::<Event>(EVENT_QUEUE_SIZE);
    let events = EventSender::new(event_sender);

    let sensor = Poller::new(
        LatestReading::new(api.clone(), options.device_id.clone()),
        options.sensor_refresh,
    )
    .with_events(events.clone())
    .start()?;

    let history = Poller::new(
        ReadingHistory::new(api.clone(), options.device_id.clone(), options.history_hours),
        options.sensor_refresh,
    )
    .with_events(events.clone())
    .start()?;

    let devices = Poller::new(DeviceList::new(api.clone()), options.sensor_refresh)
        .with_events(events.clone())
        .start()?;

    let weather = if options.with_weather {
        Some(
            Poller::new(WeatherReport::new(api), options.weather_refresh)
                .with_events(events)
                .start()?,
        )
    } else {
        None
    };

    let (shutdown_sender, _) = broadcast::channel(1);

    Ok(SessionData {
        event_receiver,
        shutdown_sender,
        sensor,
        history,
        devices,
        weather,
        options,
        api_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFarmApi;

    fn mock_api() -> Arc<dyn FarmApi> {
        let mut mock = MockFarmApi::new();
        mock.expect_base_url()
            .return_const("http://localhost:5000".to_string());
        Arc::new(mock)
    }

    fn options(device_id: &str) -> WatchOptions {
        WatchOptions {
            device_id: device_id.to_string(),
            history_hours: 24,
            sensor_refresh: Duration::from_secs(10),
            weather_refresh: Duration::from_secs(300),
            with_weather: false,
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_device() {
        let result = setup_session(mock_api(), options(""));
        assert!(matches!(result, Err(PollerError::EmptyResource)));
    }

    #[tokio::test]
    async fn test_rejects_zero_refresh() {
        let mut opts = options("esp8266-01");
        opts.sensor_refresh = Duration::ZERO;
        let result = setup_session(mock_api(), opts);
        assert!(matches!(result, Err(PollerError::ZeroInterval)));
    }
}

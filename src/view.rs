//! Text rendering of polled state
//!
//! Every feed goes through the same policy:
//! - nothing yet and no error: a loading line
//! - no data but an error: a blocking error card, nothing else
//! - data: the data, plus a transient notice when the last refresh failed

use crate::consts::cli_consts::gauges;
use crate::history::HistorySeries;
use crate::model::{Device, SensorReading, Weather};
use crate::poller::{FetchFailure, FetchState};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, PartialEq)]
pub enum Presentation<'a, T> {
    Loading,
    Blocked(&'a FetchFailure),
    Ready {
        data: &'a T,
        notice: Option<&'a FetchFailure>,
    },
}

pub fn present<T>(state: &FetchState<T>) -> Presentation<'_, T> {
    match (&state.data, &state.error) {
        (Some(data), notice) => Presentation::Ready {
            data,
            notice: notice.as_ref(),
        },
        (None, Some(failure)) => Presentation::Blocked(failure),
        (None, None) => Presentation::Loading,
    }
}

/// Renders a panel titled `title` using `body` for the data.
pub fn render_panel<T>(
    title: &str,
    state: &FetchState<T>,
    body: impl Fn(&T) -> Vec<String>,
) -> Vec<String> {
    match present(state) {
        Presentation::Loading => vec![format!("== {} ==", title), "Loading...".to_string()],
        Presentation::Blocked(failure) => error_card(failure),
        Presentation::Ready { data, notice } => {
            let mut lines = vec![format!("== {} ==", title)];
            lines.extend(body(data));
            if let Some(failure) = notice {
                lines.push(format!("! {} (showing last known values)", failure));
            }
            lines
        }
    }
}

/// One panel of the live session, reprinted only when what it shows changes.
///
/// The `loading` flag is ignored: with a slow upstream a new tick may start
/// before the previous one settles, and the settled data or error must still
/// reach the screen.
pub struct Panel<T> {
    title: &'static str,
    shown_data: Option<T>,
    shown_error: Option<FetchFailure>,
}

impl<T: Clone + PartialEq> Panel<T> {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            shown_data: None,
            shown_error: None,
        }
    }

    /// Lines to print for `state`, or `None` when the panel already shows it.
    pub fn update(
        &mut self,
        state: &FetchState<T>,
        body: impl Fn(&T) -> Vec<String>,
    ) -> Option<Vec<String>> {
        if state.data == self.shown_data && state.error == self.shown_error {
            return None;
        }
        self.shown_data = state.data.clone();
        self.shown_error = state.error.clone();
        Some(render_panel(self.title, state, body))
    }
}

fn error_card(failure: &FetchFailure) -> Vec<String> {
    vec!["Error".to_string(), failure.message.clone()]
}

/// Share of the gauge filled by `value`, clamped to 0..=100.
pub fn gauge_fill(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

fn gauge_line(label: &str, value: f64, unit: &str, max: f64) -> String {
    const WIDTH: usize = 20;
    let fill = gauge_fill(value, max);
    let filled = ((fill / 100.0) * WIDTH as f64).round() as usize;
    format!(
        "{:<14}{:>7.1}{:<3} [{}{}] {:>3.0}%",
        label,
        value,
        unit,
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        fill
    )
}

pub fn reading_lines(reading: &SensorReading) -> Vec<String> {
    vec![
        gauge_line("Temperature", reading.temperature, "°C", gauges::TEMPERATURE_MAX),
        gauge_line("Humidity", reading.humidity, "%", gauges::HUMIDITY_MAX),
        gauge_line(
            "Soil Moisture",
            reading.soil_moisture,
            "%",
            gauges::SOIL_MOISTURE_MAX,
        ),
        format!("Battery {:.0}% | Updated {}", reading.battery_level, reading.timestamp),
    ]
}

pub fn history_lines(series: &HistorySeries) -> Vec<String> {
    if series.is_empty() {
        return vec!["No readings in this window".to_string()];
    }
    let mut lines = vec![format!(
        "{:<10} {:>8} {:>8} {:>8}",
        "Time", "Temp", "Humid", "Soil"
    )];
    lines.extend((0..series.len()).map(|i| {
        format!(
            "{:<10} {:>8.1} {:>8.1} {:>8.1}",
            series.timestamps[i], series.temperature[i], series.humidity[i], series.soil_moisture[i]
        )
    }));
    lines
}

pub fn device_lines(devices: &[Device]) -> Vec<String> {
    if devices.is_empty() {
        return vec!["No devices registered".to_string()];
    }
    let mut lines = vec![format!(
        "{:<16} {:<18} {:<10} {:<20} {}",
        "Device", "MAC", "Firmware", "Last seen", "Status"
    )];
    lines.extend(devices.iter().map(|device| {
        format!(
            "{:<16} {:<18} {:<10} {:<20} {}",
            device.device_id,
            device.mac_address,
            device.firmware_version.as_deref().unwrap_or(NOT_AVAILABLE),
            device.last_seen.as_deref().unwrap_or(NOT_AVAILABLE),
            device.status
        )
    }));
    lines
}

pub fn weather_lines(weather: &Weather) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:.0}°C (feels like {:.0}°C) | Humidity {}% | Rain {} mm | Wind {} km/h",
            weather.temperature.round(),
            (weather.temperature - 1.0).round(),
            weather.humidity,
            weather.precipitation,
            weather.wind_speed
        ),
    ];
    lines.extend(weather.forecast.iter().map(|day| {
        format!(
            "{:<5} {} {:.0}°/{:.0}° {}",
            day.day,
            day.icon,
            day.temperature.min.round(),
            day.temperature.max.round(),
            day.condition
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFarmApi;
    use crate::api::error::{ApiError, ErrorKind};
    use crate::poller::Poller;
    use crate::poller::resources::LatestReading;
    use std::sync::Arc;
    use std::time::Duration;

    fn failure(message: &str) -> FetchFailure {
        FetchFailure {
            kind: ErrorKind::Network,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_present_policy() {
        let loading: FetchState<u8> = FetchState::default();
        assert_eq!(present(&loading), Presentation::Loading);

        let blocked: FetchState<u8> = FetchState {
            data: None,
            error: Some(failure("down")),
            loading: false,
        };
        assert!(matches!(present(&blocked), Presentation::Blocked(f) if f.message == "down"));

        let stale = FetchState {
            data: Some(3u8),
            error: Some(failure("down")),
            loading: true,
        };
        assert!(matches!(
            present(&stale),
            Presentation::Ready { data: &3, notice: Some(_) }
        ));
    }

    #[test]
    fn test_panel_prints_only_on_change() {
        let mut panel = Panel::new("Sensors");
        let body = |v: &u8| vec![v.to_string()];

        let mut state: FetchState<u8> = FetchState {
            data: None,
            error: None,
            loading: true,
        };
        assert_eq!(panel.update(&state, body), None);

        state.error = Some(failure("Failed to fetch sensor data"));
        assert_eq!(
            panel.update(&state, body),
            Some(vec!["Error".to_string(), "Failed to fetch sensor data".to_string()])
        );
        assert_eq!(panel.update(&state, body), None);

        state.apply_success(4);
        state.loading = true;
        let lines = panel.update(&state, body).unwrap();
        assert_eq!(lines, vec!["== Sensors ==".to_string(), "4".to_string()]);
    }

    #[test]
    fn test_gauge_fill() {
        assert_eq!(gauge_fill(25.0, 50.0), 50.0);
        assert_eq!(gauge_fill(120.0, 100.0), 100.0);
        assert_eq!(gauge_fill(-5.0, 50.0), 0.0);
        assert_eq!(gauge_fill(10.0, 0.0), 0.0);
    }

    #[test]
    // Stale data stays on screen with a notice under it.
    fn test_stale_panel_shows_notice() {
        let state = FetchState {
            data: Some(vec![Device {
                device_id: "esp8266-01".to_string(),
                mac_address: "AA:BB".to_string(),
                firmware_version: None,
                last_seen: None,
                status: "online".to_string(),
            }]),
            error: Some(failure("Failed to fetch devices")),
            loading: false,
        };
        let lines = render_panel("Devices", &state, |d| device_lines(d));
        assert_eq!(lines[0], "== Devices ==");
        assert!(lines[2].contains("N/A"));
        assert_eq!(
            lines.last().unwrap(),
            "! Failed to fetch devices (showing last known values)"
        );
    }

    #[test]
    fn test_history_lines_one_row_per_reading() {
        let series = HistorySeries {
            temperature: vec![20.0, 21.5],
            humidity: vec![50.0, 51.0],
            soil_moisture: vec![30.0, 29.0],
            battery_level: vec![90.0, 89.0],
            timestamps: vec!["10:00:00".to_string(), "10:05:00".to_string()],
        };
        let lines = history_lines(&series);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("10:05:00"));
        assert!(lines[2].contains("21.5"));
    }

    #[tokio::test(start_paused = true)]
    // A 500 from the sensor endpoint blocks the panel with an error card and no gauges.
    async fn test_sensor_server_error_shows_error_card() {
        let mut mock = MockFarmApi::new();
        mock.expect_latest_reading().returning(|_| {
            Err(ApiError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            })
        });

        let subscription = Poller::new(
            LatestReading::new(Arc::new(mock), "esp8266-01"),
            Duration::from_secs(10),
        )
        .start()
        .unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;

        let lines = render_panel("Sensors", &subscription.state(), |r| reading_lines(r));
        assert_eq!(lines, vec!["Error", "Failed to fetch sensor data"]);
        assert!(!lines.iter().any(|l| l.contains("Temperature")));
    }
}

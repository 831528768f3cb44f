//! Headless mode execution

use super::SessionData;
use crate::logging::LogLevel;
use crate::messages::print_block;
use crate::poller::FetchState;
use crate::view::{Panel, device_lines, history_lines, reading_lines, weather_lines};
use crate::{print_cmd_info, print_cmd_success};
use std::error::Error;
use tokio::sync::watch;

/// Waits for the next change of an optional feed; pends forever when absent.
async fn changed<T>(receiver: &mut Option<watch::Receiver<FetchState<T>>>) -> bool {
    match receiver {
        Some(receiver) => receiver.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Runs the dashboard in the terminal until Ctrl+C.
///
/// This function handles:
/// 1. Console event logging, filtered by `RUST_LOG`
/// 2. Re-rendering a panel whenever its feed changes
/// 3. Ctrl+C shutdown handling
///
/// A panel is printed when its data or error changes; refreshes that return
/// the same values stay quiet.
pub async fn run_headless_mode(mut session: SessionData) -> Result<(), Box<dyn Error>> {
    print_cmd_info!(
        "Watching device",
        "{} (history {}h, refresh every {}s)",
        session.options.device_id,
        session.options.history_hours,
        session.options.sensor_refresh.as_secs()
    );
    let mut feeds = vec![
        (session.sensor.name(), session.sensor.path()),
        (session.history.name(), session.history.path()),
        (session.devices.name(), session.devices.path()),
    ];
    if let Some(weather) = &session.weather {
        feeds.push((weather.name(), weather.path()));
    }
    for (name, path) in feeds {
        print_cmd_info!("Polling", "{} -> {}/{}", name, session.api_url, path);
    }

    let shutdown_sender_clone = session.shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let threshold = LogLevel::threshold_from_env();
    let mut shutdown_receiver = session.shutdown_sender.subscribe();
    let mut sensor = session.sensor.watch();
    let mut history = session.history.watch();
    let mut devices = session.devices.watch();
    let mut weather = session.weather.as_ref().map(|s| s.watch());
    let mut sensor_panel = Panel::new("Sensors");
    let mut history_panel = Panel::new("History");
    let mut devices_panel = Panel::new("Devices");
    let mut weather_panel = Panel::new("Weather");

    loop {
        tokio::select! {
            Some(event) = session.event_receiver.recv() => {
                if event.should_display(threshold) {
                    println!("{}", event);
                }
            }
            Ok(()) = sensor.changed() => {
                let state = sensor.borrow_and_update().clone();
                if let Some(lines) = sensor_panel.update(&state, reading_lines) {
                    print_block(&lines);
                }
            }
            Ok(()) = history.changed() => {
                let state = history.borrow_and_update().clone();
                if let Some(lines) = history_panel.update(&state, history_lines) {
                    print_block(&lines);
                }
            }
            Ok(()) = devices.changed() => {
                let state = devices.borrow_and_update().clone();
                if let Some(lines) = devices_panel.update(&state, |d| device_lines(d)) {
                    print_block(&lines);
                }
            }
            true = changed(&mut weather) => {
                if let Some(receiver) = weather.as_mut() {
                    let state = receiver.borrow_and_update().clone();
                    if let Some(lines) = weather_panel.update(&state, weather_lines) {
                        print_block(&lines);
                    }
                }
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        }
    }

    session.stop_all();
    print_cmd_success!("Stopped watching", "{}", session.options.device_id);
    Ok(())
}

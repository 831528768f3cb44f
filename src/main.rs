mod api;
mod config;
mod consts;
mod events;
mod history;
mod logging;
mod messages;
mod model;
mod poller;
mod registration;
mod session;
mod view;

use crate::api::{FarmApi, FarmApiClient};
use crate::config::{Config, get_config_path};
use crate::consts::cli_consts::{API_URL_ENV, http};
use crate::messages::print_block;
use crate::poller::resources::{
    DefaultReadings, DeviceList, LatestReading, ReadingHistory, WeatherReport,
};
use crate::poller::{FetchState, Poller, Resource};
use crate::registration::{RegistrationError, RegistrationForm};
use crate::session::{WatchOptions, run_headless_mode, setup_session};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Base address of the farm API, overriding the config file
    #[arg(long, global = true, env = API_URL_ENV, value_name = "URL")]
    api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch a device live until Ctrl+C
    Watch {
        /// Device to watch
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: Option<String>,

        /// Seconds between sensor, history and device refreshes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,

        /// Width of the history window in hours
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        history_hours: Option<u32>,

        /// Do not poll the weather endpoint
        #[arg(long)]
        skip_weather: bool,
    },
    /// Print the latest reading of a device
    Reading {
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: Option<String>,
    },
    /// Print the latest reading from the default-device endpoint
    Latest,
    /// Print the readings of a device over a time window
    History {
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: Option<String>,

        /// Width of the window in hours
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        hours: Option<u32>,
    },
    /// List registered devices
    Devices,
    /// Register a new device
    Register {
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: String,

        /// Hardware address of the device, e.g. AA:BB:CC:DD:EE:FF
        #[arg(long, value_name = "MAC_ADDRESS")]
        mac_address: String,
    },
    /// Start a firmware rollout for a device
    Deploy {
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: String,
    },
    /// Print current weather and forecast
    Weather,
    /// Update the saved configuration
    Configure {
        #[arg(long, value_name = "DEVICE_ID")]
        device_id: Option<String>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        history_hours: Option<u32>,
    },
    /// Delete the saved configuration
    Reset,
}

/// Fetches `resource` once and prints it under `title`, or reports the failure.
async fn print_once<R: Resource>(
    title: &str,
    resource: R,
    body: impl Fn(&R::Output) -> Vec<String>,
) -> Result<(), Box<dyn Error>> {
    match resource.fetch().await {
        Ok(data) => {
            let mut state = FetchState::default();
            state.apply_success(data);
            print_block(&view::render_panel(title, &state, body));
            Ok(())
        }
        Err(e) => {
            print_cmd_error!(resource.failure_message(), "{}", e);
            Err(e.into())
        }
    }
}

fn require_device(device_id: &str) -> Result<(), Box<dyn Error>> {
    if device_id.trim().is_empty() {
        return Err(Box::from(
            "No device configured. Pass --device-id or run `configure --device-id`.",
        ));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = get_config_path()?;
    let args = Args::parse();

    let mut config = Config::load_or_default(&config_path)
        .map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }

    match args.command {
        Command::Configure {
            device_id,
            interval_secs,
            history_hours,
        } => {
            if let Some(device_id) = device_id {
                config.device_id = device_id;
            }
            if let Some(secs) = interval_secs {
                config.sensor_refresh_secs = secs;
            }
            if let Some(hours) = history_hours {
                config.history_hours = hours;
            }
            config
                .save(&config_path)
                .map_err(|e| format!("Failed to save config: {}", e))?;
            print_cmd_success!("Configuration saved", "{}", config_path.display());
            Ok(())
        }
        Command::Reset => {
            println!("Clearing configuration file...");
            Config::clear(&config_path).map_err(Into::into)
        }
        command => run(command, config).await,
    }
}

async fn run(command: Command, config: Config) -> Result<(), Box<dyn Error>> {
    let api: Arc<dyn FarmApi> = Arc::new(FarmApiClient::new(config.api_url.clone())?);

    match command {
        Command::Watch {
            device_id,
            interval_secs,
            history_hours,
            skip_weather,
        } => {
            let device_id = device_id.unwrap_or_else(|| config.device_id.clone());
            require_device(&device_id)?;
            let options = WatchOptions {
                device_id,
                history_hours: history_hours.unwrap_or(config.history_hours),
                sensor_refresh: interval_secs
                    .map(std::time::Duration::from_secs)
                    .unwrap_or_else(|| config.sensor_refresh()),
                weather_refresh: config.weather_refresh(),
                with_weather: !skip_weather,
            };
            let session = setup_session(api, options)?;
            run_headless_mode(session).await
        }
        Command::Reading { device_id } => {
            let device_id = device_id.unwrap_or(config.device_id);
            require_device(&device_id)?;
            let title = format!("Sensors: {}", device_id);
            print_once(&title, LatestReading::new(api, device_id), view::reading_lines).await
        }
        Command::Latest => {
            print_once("Sensors", DefaultReadings::new(api), |snapshot| {
                match snapshot.latest() {
                    Some(reading) => {
                        let mut lines = vec![format!(
                            "Device {} ({} readings returned)",
                            reading.device_id,
                            snapshot.readings().len()
                        )];
                        lines.extend(view::reading_lines(reading));
                        lines
                    }
                    None => vec!["No readings yet".to_string()],
                }
            })
            .await
        }
        Command::History { device_id, hours } => {
            let device_id = device_id.unwrap_or(config.device_id);
            require_device(&device_id)?;
            let hours = hours.unwrap_or(config.history_hours);
            let title = format!("History: {} ({}h)", device_id, hours);
            let resource = ReadingHistory::new(api, device_id, hours);
            print_once(&title, resource, view::history_lines).await
        }
        Command::Devices => {
            print_once("Devices", DeviceList::new(api), |d| view::device_lines(d)).await
        }
        Command::Weather => print_once("Weather", WeatherReport::new(api), view::weather_lines).await,
        Command::Deploy { device_id } => match api.deploy_firmware(&device_id).await {
            Ok(deployment) => {
                print_cmd_success!("Deployment started", "{}", device_id);
                if let Some(message) = deployment.message {
                    print_cmd_info!("Server", "{}", message);
                }
                println!("{}", deployment.ota_url);
                Ok(())
            }
            Err(e) => {
                print_cmd_error!("Failed to deploy firmware", "{}", e);
                Err(e.into())
            }
        },
        Command::Register {
            device_id,
            mac_address,
        } => {
            let devices = Poller::new(DeviceList::new(api.clone()), config.sensor_refresh())
                .start()?;
            let mut form = RegistrationForm::new(device_id, mac_address);
            let registered = match registration::submit(api.as_ref(), &mut form, &devices).await {
                Ok(registered) => registered,
                Err(RegistrationError::Api(e)) if e.status() == Some(409) => {
                    print_cmd_warn!("Registration failed", "{} is already registered", form.device_id);
                    return Err(e.into());
                }
                Err(e) => {
                    print_cmd_error!("Registration failed", "{}", e);
                    return Err(e.into());
                }
            };
            print_cmd_success!("Device registered", "{}", registered.device_id);

            // Show the list once the refetch triggered by the registration lands.
            let mut receiver = devices.watch();
            let listed = receiver.wait_for(|state| {
                !state.loading
                    && state.data.as_ref().is_some_and(|list| {
                        list.iter().any(|d| d.device_id == registered.device_id)
                    })
            });
            if tokio::time::timeout(http::request_timeout(), listed)
                .await
                .is_err()
            {
                print_cmd_warn!("Device list", "{} not listed yet", registered.device_id);
            }
            print_block(&view::render_panel("Devices", &devices.state(), |d| {
                view::device_lines(d)
            }));
            devices.stop();
            Ok(())
        }
        Command::Configure { .. } | Command::Reset => Ok(()),
    }
}

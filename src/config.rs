//! Application configuration.

use crate::consts::cli_consts::{DEFAULT_API_URL, DEFAULT_DEVICE_ID, polling};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base address of the farm API.
    pub api_url: String,
    /// Device shown by the live views.
    pub device_id: String,
    /// Refresh cadence of sensor, history and device views.
    pub sensor_refresh_secs: u64,
    /// Refresh cadence of the weather view.
    pub weather_refresh_secs: u64,
    /// Width of the history window.
    pub history_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            sensor_refresh_secs: polling::SENSOR_REFRESH_SECS,
            weather_refresh_secs: polling::WEATHER_REFRESH_SECS,
            history_hours: polling::HISTORY_HOURS,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Loads the file at `path` when present, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Deletes the configuration file. A missing file is not an error.
    pub fn clear(path: &Path) -> Result<(), std::io::Error> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Sensor cadence; a zero in a hand-edited file means the default.
    pub fn sensor_refresh(&self) -> Duration {
        match self.sensor_refresh_secs {
            0 => polling::sensor_refresh(),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn weather_refresh(&self) -> Duration {
        match self.weather_refresh_secs {
            0 => polling::weather_refresh(),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Location of the configuration file, `~/.farm-monitor/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine the home directory",
        )
    })?;
    Ok(home.join(".farm-monitor").join("config.json"))
}

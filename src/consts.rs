pub mod cli_consts {
    //! Monitor Configuration Constants
    //!
    //! This module contains all configuration constants for the monitor,
    //! organized by functional area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// Maximum number of buffered events between pollers and the session
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // API DEFAULTS
    // =============================================================================

    /// Base address of the farm API on the gateway host
    pub const DEFAULT_API_URL: &str = "http://localhost:5000";

    /// Device polled when none is configured
    pub const DEFAULT_DEVICE_ID: &str = "esp8266-01";

    /// Environment variable overriding the configured API address
    pub const API_URL_ENV: &str = "FARM_API_URL";

    // =============================================================================
    // POLLING CONFIGURATION
    // =============================================================================

    /// Refresh cadence of every polled view
    pub mod polling {
        use std::time::Duration;

        /// Sensor readings, history and the device list (seconds)
        pub const SENSOR_REFRESH_SECS: u64 = 10;

        /// Weather changes slowly and the upstream is rate limited (seconds)
        pub const WEATHER_REFRESH_SECS: u64 = 5 * 60;

        /// Width of the history window (hours)
        pub const HISTORY_HOURS: u32 = 24;

        const _: () = assert!(super::http::REQUEST_TIMEOUT_SECS < SENSOR_REFRESH_SECS);

        pub const fn sensor_refresh() -> Duration {
            Duration::from_secs(SENSOR_REFRESH_SECS)
        }

        pub const fn weather_refresh() -> Duration {
            Duration::from_secs(WEATHER_REFRESH_SECS)
        }
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    pub mod http {
        use std::time::Duration;

        /// Time allowed to establish a connection (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 5;

        /// Time allowed for a whole request (seconds). Kept below the default
        /// sensor cadence so a request settles before the next tick.
        pub const REQUEST_TIMEOUT_SECS: u64 = 8;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // GAUGE CONFIGURATION
    // =============================================================================

    /// Full-scale values of the reading gauges
    pub mod gauges {
        pub const TEMPERATURE_MAX: f64 = 50.0;
        pub const HUMIDITY_MAX: f64 = 100.0;
        pub const SOIL_MOISTURE_MAX: f64 = 100.0;
    }
}

//! Log levels, the `RUST_LOG` threshold, and how API failures map onto them.

use crate::api::error::ApiError;
use std::env;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Level named by the first directive of a `RUST_LOG` style string.
    ///
    /// `farm_monitor=debug,reqwest=info` yields `Debug`; anything unknown is `Info`.
    pub fn from_directives(rust_log: &str) -> Self {
        let first = rust_log.split(',').next().unwrap_or_default();
        let level = first.rsplit('=').next().unwrap_or_default();

        match level.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    /// Threshold configured through `RUST_LOG`, `Info` when unset.
    pub fn threshold_from_env() -> Self {
        env::var("RUST_LOG")
            .map(|value| Self::from_directives(&value))
            .unwrap_or(LogLevel::Info)
    }

    pub fn passes(self, threshold: LogLevel) -> bool {
        self >= threshold
    }
}

/// Severity of a failed request, used for both events and exit messages.
pub fn classify_api_error(error: &ApiError) -> LogLevel {
    match error {
        // Credentials or deployment problems the operator has to fix
        ApiError::Http { status: 401 | 403, .. } => LogLevel::Error,
        // No readings yet for a fresh device
        ApiError::Http { status: 404, .. } => LogLevel::Info,
        // Server hiccups, retried on the next tick
        ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,
        ApiError::Http { .. } => LogLevel::Warn,
        ApiError::Network(_) => LogLevel::Warn,
        // The API and this client disagree on a schema
        ApiError::Decode(_) => LogLevel::Error,
    }
}

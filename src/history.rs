//! Projection of a windowed reading history into chart series.

use crate::model::SensorReading;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Index-aligned series: entry `i` of every vector comes from reading `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub soil_moisture: Vec<f64>,
    pub battery_level: Vec<f64>,
    pub timestamps: Vec<String>,
}

impl HistorySeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Splits readings into parallel series with local time-of-day labels.
///
/// Order is kept as received. No resampling, gap filling or outlier handling.
pub fn project(readings: &[SensorReading]) -> HistorySeries {
    project_in(readings, &Local)
}

pub fn project_in<Tz: TimeZone>(readings: &[SensorReading], tz: &Tz) -> HistorySeries
where
    Tz::Offset: std::fmt::Display,
{
    let mut series = HistorySeries {
        temperature: Vec::with_capacity(readings.len()),
        humidity: Vec::with_capacity(readings.len()),
        soil_moisture: Vec::with_capacity(readings.len()),
        battery_level: Vec::with_capacity(readings.len()),
        timestamps: Vec::with_capacity(readings.len()),
    };

    for reading in readings {
        series.temperature.push(reading.temperature);
        series.humidity.push(reading.humidity);
        series.soil_moisture.push(reading.soil_moisture);
        series.battery_level.push(reading.battery_level);
        series.timestamps.push(time_of_day(&reading.timestamp, tz));
    }

    series
}

/// Formats a timestamp as `HH:MM:SS` in `tz`.
///
/// Offset-less timestamps are UTC, which is how the API stores them.
/// Anything unparseable is returned verbatim so the series stay aligned.
pub fn time_of_day<Tz: TimeZone>(timestamp: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(timestamp) {
        Some(instant) => instant.with_timezone(tz).format("%H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let trimmed = timestamp.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn reading(temperature: f64, timestamp: &str) -> SensorReading {
        SensorReading {
            device_id: "esp8266-01".to_string(),
            temperature,
            humidity: temperature + 30.0,
            soil_moisture: temperature + 10.0,
            battery_level: 90.0,
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    // Every series has one entry per reading, in input order.
    fn test_series_are_index_aligned() {
        let readings: Vec<_> = (0..5)
            .map(|i| reading(20.0 + i as f64, &format!("2024-05-01 10:0{}:00", i)))
            .collect();
        let series = project_in(&readings, &Utc);

        assert_eq!(series.len(), 5);
        assert_eq!(series.temperature.len(), 5);
        assert_eq!(series.humidity.len(), 5);
        assert_eq!(series.soil_moisture.len(), 5);
        assert_eq!(series.battery_level.len(), 5);
        for (i, r) in readings.iter().enumerate() {
            assert_eq!(series.temperature[i], r.temperature);
            assert_eq!(series.humidity[i], r.humidity);
            assert_eq!(series.timestamps[i], format!("10:0{}:00", i));
        }
    }

    #[test]
    fn test_empty_history() {
        let series = project(&[]);
        assert!(series.is_empty());
        assert!(series.temperature.is_empty());
    }

    #[test]
    fn test_time_of_day_formats() {
        assert_eq!(time_of_day("2024-05-01 06:30:15", &Utc), "06:30:15");
        assert_eq!(time_of_day("2024-05-01T06:30:15.250", &Utc), "06:30:15");
        assert_eq!(time_of_day("2024-05-01T06:30:15Z", &Utc), "06:30:15");

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(time_of_day("2024-05-01 23:00:00", &plus_two), "01:00:00");
        assert_eq!(
            time_of_day("2024-05-01T08:00:00+02:00", &Utc),
            "06:00:00"
        );
    }

    #[test]
    // A bad timestamp must not shift the remaining labels.
    fn test_unparseable_timestamp_passes_through() {
        let readings = vec![
            reading(1.0, "2024-05-01 10:00:00"),
            reading(2.0, "yesterday-ish"),
            reading(3.0, "2024-05-01 10:02:00"),
        ];
        let series = project_in(&readings, &Utc);
        assert_eq!(
            series.timestamps,
            vec!["10:00:00", "yesterday-ish", "10:02:00"]
        );
        assert_eq!(series.temperature, vec![1.0, 2.0, 3.0]);
    }
}

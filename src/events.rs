//! Event System
//!
//! Events emitted by pollers and one-shot commands, printed by the session

use crate::logging::LogLevel;
use chrono::Local;
use std::fmt::Display;
use tokio::sync::mpsc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Name of the feed or command that produced the event.
    pub source: String,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        msg: String,
        event_type: EventType,
        log_level: LogLevel,
    ) -> Self {
        Self {
            source: source.into(),
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn should_display(&self, threshold: LogLevel) -> bool {
        self.log_level.passes(threshold)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.event_type, self.timestamp, self.source, self.msg
        )
    }
}

/// Cloneable handle pollers use to publish events.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send_event(&self, event: Event) {
        // A closed session just means nobody is listening anymore.
        let _ = self.sender.send(event).await;
    }

    pub async fn send(
        &self,
        source: &str,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::new(source, message, event_type, log_level))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let event = Event::new(
            "devices",
            "Failed to fetch devices".to_string(),
            EventType::Error,
            LogLevel::Warn,
        );
        let line = event.to_string();
        assert!(line.starts_with("Error ["));
        assert!(line.ends_with("devices: Failed to fetch devices"));
    }

    #[test]
    fn test_should_display_respects_threshold() {
        let refresh = Event::new("s", "x".into(), EventType::Refresh, LogLevel::Debug);
        assert!(!refresh.should_display(LogLevel::Info));
        assert!(refresh.should_display(LogLevel::Debug));

        let failure = Event::new("s", "x".into(), EventType::Error, LogLevel::Error);
        assert!(failure.should_display(LogLevel::Warn));
    }

    #[tokio::test]
    async fn test_sender_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender
            .send("s", "late".into(), EventType::Notice, LogLevel::Info)
            .await;
    }
}

//! Immediate-plus-periodic polling of one remote resource
//!
//! A [`Poller`] fetches its resource as soon as it starts and then on a fixed
//! interval. Consumers own the returned [`Subscription`]: it exposes the latest
//! [`FetchState`] and stops the timer when stopped or dropped.
//!
//! Ticks are not serialized. A slow request may still be outstanding when the
//! next one is issued, so every request carries a sequence number and a
//! response older than the last applied one is discarded.

pub mod resources;
pub mod state;

pub use state::{FetchFailure, FetchState};

use crate::api::error::ApiError;
use crate::events::{EventSender, EventType};
use crate::logging::{LogLevel, classify_api_error};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Notify, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollerError {
    #[error("Polling interval must be greater than zero")]
    ZeroInterval,

    #[error("Resource path must not be empty")]
    EmptyResource,
}

/// One remote endpoint a poller can mirror.
#[async_trait::async_trait]
pub trait Resource: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Short name used as the event source.
    fn name(&self) -> &str;

    /// Endpoint path relative to the API base address.
    fn path(&self) -> String;

    /// Message stored in the state when a fetch fails.
    fn failure_message(&self) -> &str;

    async fn fetch(&self) -> Result<Self::Output, ApiError>;
}

/// Something that can be asked to re-fetch ahead of schedule.
pub trait Refresh {
    fn refresh(&self);
}

#[derive(Debug, Default)]
struct Gate {
    stopped: bool,
    issued: u64,
    applied: u64,
    in_flight: usize,
}

enum Settled {
    Applied,
    Superseded,
    Dropped,
}

struct Shared<T> {
    state: watch::Sender<FetchState<T>>,
    gate: Mutex<Gate>,
}

impl<T> Shared<T> {
    fn gate(&self) -> MutexGuard<'_, Gate> {
        // Counters are only touched under the lock and never left half-updated.
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserves the next sequence number, or `None` once stopped.
    fn begin(&self) -> Option<u64> {
        let mut gate = self.gate();
        if gate.stopped {
            return None;
        }
        gate.issued += 1;
        gate.in_flight += 1;
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.loading, true));
        Some(gate.issued)
    }

    fn settle(&self, seq: u64, outcome: Result<T, FetchFailure>) -> Settled {
        let mut gate = self.gate();
        if gate.stopped {
            return Settled::Dropped;
        }
        gate.in_flight = gate.in_flight.saturating_sub(1);
        let loading = gate.in_flight > 0;

        if seq < gate.applied {
            self.state
                .send_if_modified(|state| std::mem::replace(&mut state.loading, loading) != loading);
            return Settled::Superseded;
        }

        gate.applied = seq;
        self.state.send_modify(|state| {
            match outcome {
                Ok(data) => state.apply_success(data),
                Err(failure) => state.apply_failure(failure),
            }
            state.loading = loading;
        });
        Settled::Applied
    }

    fn stop(&self) {
        let mut gate = self.gate();
        if gate.stopped {
            return;
        }
        gate.stopped = true;
        gate.in_flight = 0;
        self.state
            .send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }
}

/// Configures and starts polling of one resource.
pub struct Poller<R: Resource> {
    resource: R,
    period: Duration,
    events: Option<EventSender>,
}

impl<R: Resource> Poller<R> {
    pub fn new(resource: R, period: Duration) -> Self {
        Self {
            resource,
            period,
            events: None,
        }
    }

    /// Publish Refresh/Success/Error events for every tick.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Issues the first fetch immediately and keeps polling until the
    /// subscription is stopped or dropped. Must be called inside a Tokio runtime.
    pub fn start(self) -> Result<Subscription<R::Output>, PollerError> {
        if self.period.is_zero() {
            return Err(PollerError::ZeroInterval);
        }
        let path = self.resource.path();
        if path.trim().is_empty() {
            return Err(PollerError::EmptyResource);
        }

        let (sender, receiver) = watch::channel(FetchState::default());
        let shared = Arc::new(Shared {
            state: sender,
            gate: Mutex::new(Gate::default()),
        });
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());
        let name = self.resource.name().to_string();

        tokio::spawn(run_timer(
            Arc::new(self.resource),
            self.period,
            shared.clone(),
            cancel.clone(),
            refresh.clone(),
            self.events,
        ));

        Ok(Subscription {
            name,
            path,
            shared,
            cancel,
            refresh,
            receiver,
        })
    }
}

async fn run_timer<R: Resource>(
    resource: Arc<R>,
    period: Duration,
    shared: Arc<Shared<R::Output>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    events: Option<EventSender>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // The first tick of an interval completes immediately.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        let Some(seq) = shared.begin() else {
            break;
        };
        tokio::spawn(fetch_once(
            resource.clone(),
            seq,
            shared.clone(),
            cancel.clone(),
            events.clone(),
        ));
    }
}

async fn fetch_once<R: Resource>(
    resource: Arc<R>,
    seq: u64,
    shared: Arc<Shared<R::Output>>,
    cancel: CancellationToken,
    events: Option<EventSender>,
) {
    if let Some(events) = &events {
        events
            .send(
                resource.name(),
                format!("Fetching {} (#{})", resource.path(), seq),
                EventType::Refresh,
                LogLevel::Debug,
            )
            .await;
    }

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = resource.fetch() => result,
    };

    let (outcome, error) = match result {
        Ok(data) => (Ok(data), None),
        Err(error) => {
            let failure = FetchFailure {
                kind: error.kind(),
                message: resource.failure_message().to_string(),
            };
            (Err(failure), Some(error))
        }
    };

    let settled = shared.settle(seq, outcome);

    let Some(events) = events else {
        return;
    };
    match (settled, error) {
        (Settled::Applied, None) => {
            events
                .send(
                    resource.name(),
                    format!("Updated {} (#{})", resource.path(), seq),
                    EventType::Success,
                    LogLevel::Debug,
                )
                .await;
        }
        (Settled::Applied, Some(error)) => {
            events
                .send(
                    resource.name(),
                    format!("{}: {}", resource.failure_message(), error),
                    EventType::Error,
                    classify_api_error(&error),
                )
                .await;
        }
        (Settled::Superseded, _) => {
            events
                .send(
                    resource.name(),
                    format!("Discarded out-of-order response #{}", seq),
                    EventType::Notice,
                    LogLevel::Debug,
                )
                .await;
        }
        (Settled::Dropped, _) => {}
    }
}

/// A running poller, owned by the view that consumes it.
pub struct Subscription<T> {
    name: String,
    path: String,
    shared: Arc<Shared<T>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    receiver: watch::Receiver<FetchState<T>>,
}

impl<T: Clone> Subscription<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.receiver.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<FetchState<T>> {
        self.receiver.clone()
    }

    /// Stops the timer and drops any in-flight response.
    ///
    /// Once this returns the state never changes again.
    pub fn stop(&self) {
        self.shared.stop();
        self.cancel.cancel();
    }
}

impl<T> Refresh for Subscription<T> {
    fn refresh(&self) {
        self.refresh.notify_one();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shared.stop();
        self.cancel.cancel();
    }
}

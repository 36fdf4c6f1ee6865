//! Pre-send observers and downstream sinks
//!
//! Every action a tracker emits is first shown to its [`ActionObserver`],
//! which may rewrite the attribute bag and may suppress forwarding. Unless
//! suppressed, the finished [`VideoEvent`] is handed to the tracker's
//! [`EventSink`], the stand-in for a reporting backend.
//!
//! Observers run while the tracker is locked and must not call back into
//! the tracker that invoked them.

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::Serialize;

use super::action::{Action, EventType};
use super::attributes::Attributes;

/// Hook invoked right before an emitted action is forwarded
pub trait ActionObserver: Send {
    /// Inspect (and optionally rewrite) an emitted action
    ///
    /// # Returns
    /// `true` to suppress forwarding to the sink. The state transition has
    /// already happened and is never undone.
    fn observe(&mut self, action: &Action, attributes: &mut Attributes) -> bool;
}

impl<F> ActionObserver for F
where
    F: FnMut(&Action, &mut Attributes) -> bool + Send,
{
    fn observe(&mut self, action: &Action, attributes: &mut Attributes) -> bool {
        self(action, attributes)
    }
}

/// A forwarded telemetry event
#[derive(Debug, Clone, Serialize)]
pub struct VideoEvent {
    /// Backend event type
    pub event_type: EventType,
    /// Action wire name
    pub action: String,
    /// Instant the action was emitted
    pub timestamp: DateTime<Utc>,
    /// Attribute bag after the observer ran
    pub attributes: Attributes,
}

/// Downstream destination for forwarded events
pub trait EventSink: Send + Sync {
    fn record(&self, event: VideoEvent);
}

/// Logs every forwarded event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: VideoEvent) {
        let attributes = serde_json::to_string(&event.attributes).unwrap_or_default();
        tracing::info!(
            event_type = event.event_type.as_str(),
            action = %event.action,
            timestamp = %event.timestamp,
            %attributes,
            "Video event"
        );
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: VideoEvent) {}
}

/// Hands events to a background reporter over a crossbeam channel
///
/// A bounded channel never blocks the tracker: when the reporter falls
/// behind, events are dropped and counted in the log.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<VideoEvent>,
}

impl ChannelSink {
    /// Create a sink with an unbounded queue
    pub fn unbounded() -> (Self, Receiver<VideoEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Create a sink with a queue of at most `capacity` events
    pub fn bounded(capacity: usize) -> (Self, Receiver<VideoEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn record(&self, event: VideoEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(action = %event.action, "Event queue full, dropping event");
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::debug!(action = %event.action, "Event receiver gone, dropping event");
            }
        }
    }
}

//! Videotracker - video playback telemetry tracking
//!
//! This library re-exports the tracker state machine, timing, ad
//! correlation and session registry from `videotracker-core`.

pub use videotracker_core::ads;
pub use videotracker_core::config;
pub use videotracker_core::event;
pub use videotracker_core::registry;
pub use videotracker_core::timing;
pub use videotracker_core::tracker;

pub use videotracker_core::{
    Action, ActionFilter, ActionKind, ActionObserver, AdCorrelator, AttributeValue, Attributes,
    BufferType, ChannelSink, Clock, ConfigError, EventSink, EventType, ManualClock, NullPlayer,
    NullSink, PlayerAdapter, SessionId, SystemClock, Tracker, TrackerConfig, TrackerHandle,
    TrackerRegistry, TrackerRole, TrackerState, TracingSink, VideoEvent,
};
pub use videotracker_core::{DEFAULT_HEARTBEAT_SECS, VERSION};

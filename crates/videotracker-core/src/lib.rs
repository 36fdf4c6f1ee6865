//! Videotracker Core - Tracker state machine, timing, and session registry
//!
//! This library turns high-level playback lifecycle calls (request, start,
//! pause, buffer, seek, heartbeat, end, ad breaks) into a stream of telemetry
//! actions. Redundant calls are absorbed by guarded state transitions, and
//! every emitted action carries derived timing, playtime, and counter
//! attributes. A content tracker can be paired with an ad tracker so that
//! buffering during an ad break is attributed to the ad.

pub mod ads;
pub mod config;
pub mod event;
pub mod registry;
pub mod timing;
pub mod tracker;

pub use ads::{AdCorrelator, BufferType};
pub use config::{ConfigError, TrackerConfig};
pub use event::action::{Action, ActionKind, EventType};
pub use event::attributes::{ActionFilter, AttributeValue, Attributes};
pub use event::sink::{ActionObserver, ChannelSink, EventSink, NullSink, TracingSink, VideoEvent};
pub use registry::{SessionId, TrackerRegistry};
pub use timing::clock::{Clock, ManualClock, SystemClock};
pub use tracker::handle::TrackerHandle;
pub use tracker::player::{NullPlayer, PlayerAdapter};
pub use tracker::state::TrackerState;
pub use tracker::{Tracker, TrackerRole};

/// Library version from Cargo.toml, reported as `coreVersion`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default heartbeat cadence in seconds
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

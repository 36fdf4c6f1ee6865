//! Action vocabulary
//!
//! Every emitted action has a kind (what happened) and a wire name that
//! depends on the tracker role: `Start` is `CONTENT_START` on a content
//! tracker and `AD_START` on an ad tracker.

use serde::Serialize;

use crate::tracker::TrackerRole;

pub const TRACKER_READY: &str = "TRACKER_READY";
pub const PLAYER_READY: &str = "PLAYER_READY";

pub const CONTENT_REQUEST: &str = "CONTENT_REQUEST";
pub const CONTENT_START: &str = "CONTENT_START";
pub const CONTENT_PAUSE: &str = "CONTENT_PAUSE";
pub const CONTENT_RESUME: &str = "CONTENT_RESUME";
pub const CONTENT_END: &str = "CONTENT_END";
pub const CONTENT_SEEK_START: &str = "CONTENT_SEEK_START";
pub const CONTENT_SEEK_END: &str = "CONTENT_SEEK_END";
pub const CONTENT_BUFFER_START: &str = "CONTENT_BUFFER_START";
pub const CONTENT_BUFFER_END: &str = "CONTENT_BUFFER_END";
pub const CONTENT_HEARTBEAT: &str = "CONTENT_HEARTBEAT";
pub const CONTENT_RENDITION_CHANGE: &str = "CONTENT_RENDITION_CHANGE";
pub const CONTENT_ERROR: &str = "CONTENT_ERROR";

pub const AD_REQUEST: &str = "AD_REQUEST";
pub const AD_START: &str = "AD_START";
pub const AD_PAUSE: &str = "AD_PAUSE";
pub const AD_RESUME: &str = "AD_RESUME";
pub const AD_END: &str = "AD_END";
pub const AD_SEEK_START: &str = "AD_SEEK_START";
pub const AD_SEEK_END: &str = "AD_SEEK_END";
pub const AD_BUFFER_START: &str = "AD_BUFFER_START";
pub const AD_BUFFER_END: &str = "AD_BUFFER_END";
pub const AD_HEARTBEAT: &str = "AD_HEARTBEAT";
pub const AD_RENDITION_CHANGE: &str = "AD_RENDITION_CHANGE";
pub const AD_ERROR: &str = "AD_ERROR";
pub const AD_BREAK_START: &str = "AD_BREAK_START";
pub const AD_BREAK_END: &str = "AD_BREAK_END";
pub const AD_QUARTILE: &str = "AD_QUARTILE";
pub const AD_CLICK: &str = "AD_CLICK";

const BUILTIN_NAMES: &[&str] = &[
    TRACKER_READY,
    PLAYER_READY,
    CONTENT_REQUEST,
    CONTENT_START,
    CONTENT_PAUSE,
    CONTENT_RESUME,
    CONTENT_END,
    CONTENT_SEEK_START,
    CONTENT_SEEK_END,
    CONTENT_BUFFER_START,
    CONTENT_BUFFER_END,
    CONTENT_HEARTBEAT,
    CONTENT_RENDITION_CHANGE,
    CONTENT_ERROR,
    AD_REQUEST,
    AD_START,
    AD_PAUSE,
    AD_RESUME,
    AD_END,
    AD_SEEK_START,
    AD_SEEK_END,
    AD_BUFFER_START,
    AD_BUFFER_END,
    AD_HEARTBEAT,
    AD_RENDITION_CHANGE,
    AD_ERROR,
    AD_BREAK_START,
    AD_BREAK_END,
    AD_QUARTILE,
    AD_CLICK,
];

/// Whether `name` is the wire name of a lifecycle action
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// What happened, independent of tracker role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    TrackerReady,
    PlayerReady,
    Request,
    Start,
    Pause,
    Resume,
    BufferStart,
    BufferEnd,
    SeekStart,
    SeekEnd,
    Heartbeat,
    RenditionChange,
    Error,
    End,
    AdBreakStart,
    AdBreakEnd,
    AdQuartile,
    AdClick,
    /// Caller-named action sent through `send_event`
    Custom(String),
}

/// Event type a backend files the action under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventType {
    /// Content tracker lifecycle action
    VideoAction,
    /// Ad tracker lifecycle action
    VideoAdAction,
    /// Error action from either tracker
    VideoErrorAction,
    /// Caller-named action
    VideoCustomAction,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::VideoAction => "VideoAction",
            EventType::VideoAdAction => "VideoAdAction",
            EventType::VideoErrorAction => "VideoErrorAction",
            EventType::VideoCustomAction => "VideoCustomAction",
        }
    }
}

/// An action as emitted by a tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    role: TrackerRole,
    name: String,
}

impl Action {
    /// Resolve the wire name of `kind` for a tracker of the given role
    pub fn new(kind: ActionKind, role: TrackerRole) -> Self {
        let name = Self::wire_name(&kind, role).to_string();
        Self { kind, role, name }
    }

    /// Build a caller-named action
    pub fn custom(name: impl Into<String>, role: TrackerRole) -> Self {
        let name = name.into();
        Self {
            kind: ActionKind::Custom(name.clone()),
            role,
            name,
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn role(&self) -> TrackerRole {
        self.role
    }

    /// Wire name, e.g. `CONTENT_START`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_type(&self) -> EventType {
        match (&self.kind, self.role) {
            (ActionKind::Custom(_), _) => EventType::VideoCustomAction,
            (ActionKind::Error, _) => EventType::VideoErrorAction,
            (_, TrackerRole::Ad) => EventType::VideoAdAction,
            (_, TrackerRole::Content) => EventType::VideoAction,
        }
    }

    fn wire_name(kind: &ActionKind, role: TrackerRole) -> &str {
        let content = role == TrackerRole::Content;
        let pick = |c: &'static str, a: &'static str| if content { c } else { a };
        match kind {
            ActionKind::TrackerReady => TRACKER_READY,
            ActionKind::PlayerReady => PLAYER_READY,
            ActionKind::Request => pick(CONTENT_REQUEST, AD_REQUEST),
            ActionKind::Start => pick(CONTENT_START, AD_START),
            ActionKind::Pause => pick(CONTENT_PAUSE, AD_PAUSE),
            ActionKind::Resume => pick(CONTENT_RESUME, AD_RESUME),
            ActionKind::BufferStart => pick(CONTENT_BUFFER_START, AD_BUFFER_START),
            ActionKind::BufferEnd => pick(CONTENT_BUFFER_END, AD_BUFFER_END),
            ActionKind::SeekStart => pick(CONTENT_SEEK_START, AD_SEEK_START),
            ActionKind::SeekEnd => pick(CONTENT_SEEK_END, AD_SEEK_END),
            ActionKind::Heartbeat => pick(CONTENT_HEARTBEAT, AD_HEARTBEAT),
            ActionKind::RenditionChange => pick(CONTENT_RENDITION_CHANGE, AD_RENDITION_CHANGE),
            ActionKind::Error => pick(CONTENT_ERROR, AD_ERROR),
            ActionKind::End => pick(CONTENT_END, AD_END),
            ActionKind::AdBreakStart => AD_BREAK_START,
            ActionKind::AdBreakEnd => AD_BREAK_END,
            ActionKind::AdQuartile => AD_QUARTILE,
            ActionKind::AdClick => AD_CLICK,
            ActionKind::Custom(name) => name.as_str(),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_role() {
        assert_eq!(Action::new(ActionKind::Start, TrackerRole::Content).name(), CONTENT_START);
        assert_eq!(Action::new(ActionKind::Start, TrackerRole::Ad).name(), AD_START);
        assert_eq!(Action::new(ActionKind::TrackerReady, TrackerRole::Ad).name(), TRACKER_READY);
        assert_eq!(
            Action::new(ActionKind::AdBreakEnd, TrackerRole::Ad).name(),
            AD_BREAK_END
        );
    }

    #[test]
    fn test_event_types() {
        let start = Action::new(ActionKind::Start, TrackerRole::Content);
        assert_eq!(start.event_type(), EventType::VideoAction);

        let ad_start = Action::new(ActionKind::Start, TrackerRole::Ad);
        assert_eq!(ad_start.event_type(), EventType::VideoAdAction);

        let error = Action::new(ActionKind::Error, TrackerRole::Ad);
        assert_eq!(error.event_type(), EventType::VideoErrorAction);
        assert_eq!(error.name(), AD_ERROR);

        let custom = Action::custom("TEST_ACTION", TrackerRole::Content);
        assert_eq!(custom.event_type(), EventType::VideoCustomAction);
        assert_eq!(custom.name(), "TEST_ACTION");
        assert_eq!(custom.kind(), &ActionKind::Custom("TEST_ACTION".to_string()));
    }
}

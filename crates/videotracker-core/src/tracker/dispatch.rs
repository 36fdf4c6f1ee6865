//! Guarded action dispatch
//!
//! Every `send_*` call follows the same path: check the transition guard on
//! the current [`TrackerState`], return `false` without side effects when it
//! does not hold, otherwise apply the transition, read the clock once,
//! assemble the attribute bag, show it to the observer and hand it to the
//! sink.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::player::{stamp_player_attributes, PlayerAdapter};
use super::state::TrackerState;
use super::TrackerRole;
use crate::ads::{AdCorrelator, BufferType};
use crate::config::TrackerConfig;
use crate::event::action::{is_builtin_name, Action, ActionKind};
use crate::event::attributes::{ActionFilter, AttributeValue, Attributes, CustomAttributes};
use crate::event::sink::{ActionObserver, EventSink, TracingSink, VideoEvent};
use crate::timing::clock::{Clock, SystemClock};
use crate::timing::elapsed_ms;
use crate::timing::since::{TimeSince, TimeSinceTable};

static VIEW_SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

fn new_view_session(now: DateTime<Utc>) -> String {
    let seq = VIEW_SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.timestamp_millis(), seq)
}

/// A content or ad tracker
///
/// Owns its state vector, timestamps and counters. Not internally
/// synchronized; share it across threads through
/// [`TrackerHandle`](super::handle::TrackerHandle).
pub struct Tracker {
    role: TrackerRole,
    config: TrackerConfig,
    state: TrackerState,
    clock: Arc<dyn Clock>,
    player: Option<Box<dyn PlayerAdapter>>,
    observer: Option<Box<dyn ActionObserver>>,
    sink: Arc<dyn EventSink>,
    correlator: Arc<AdCorrelator>,
    /// Linked to the other half of a content/ad pair
    paired: bool,
    time_since: TimeSinceTable,
    custom_attributes: CustomAttributes,

    view_session: String,
    view_index: u64,
    view_id: Option<String>,

    request_time: Option<DateTime<Utc>>,
    heartbeat_reference: Option<DateTime<Utc>>,
    last_event_time: Option<DateTime<Utc>>,
    /// Start of the interval the next action closes for playtime accounting
    playtime_mark: Option<DateTime<Utc>>,
    buffer_type: Option<BufferType>,

    total_playtime_ms: i64,
    number_of_videos: u64,
    number_of_errors: u64,
    number_of_ads: u64,
    ad_break_accumulated_ms: i64,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("view_id", &self.view_id)
            .field("total_playtime_ms", &self.total_playtime_ms)
            .field("number_of_videos", &self.number_of_videos)
            .field("number_of_errors", &self.number_of_errors)
            .field("number_of_ads", &self.number_of_ads)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Create a tracker with default config, the system clock and a
    /// [`TracingSink`]
    pub fn new(role: TrackerRole) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let view_session = new_view_session(clock.now());
        let time_since = match role {
            TrackerRole::Content => TimeSinceTable::content_defaults(),
            TrackerRole::Ad => TimeSinceTable::ad_defaults(),
        };
        Self {
            role,
            config: TrackerConfig::default(),
            state: TrackerState::new(),
            clock,
            player: None,
            observer: None,
            sink: Arc::new(TracingSink),
            correlator: Arc::new(AdCorrelator::new()),
            paired: false,
            time_since,
            custom_attributes: CustomAttributes::new(),
            view_session,
            view_index: 0,
            view_id: None,
            request_time: None,
            heartbeat_reference: None,
            last_event_time: None,
            playtime_mark: None,
            buffer_type: None,
            total_playtime_ms: 0,
            number_of_videos: 0,
            number_of_errors: 0,
            number_of_ads: 0,
            ad_break_accumulated_ms: 0,
        }
    }

    pub fn content() -> Self {
        Self::new(TrackerRole::Content)
    }

    pub fn ad() -> Self {
        Self::new(TrackerRole::Ad)
    }

    /// Attach a pre-send observer
    pub fn with_observer(mut self, observer: impl ActionObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_observer(&mut self, observer: impl ActionObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Attach `key` to every emitted action
    pub fn set_attribute(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.custom_attributes.set(key, value.into(), ActionFilter::any());
    }

    /// Attach `key` to actions matching `filter`, e.g. `"CONTENT_*|AD_END"`
    pub fn set_attribute_for(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
        filter: impl Into<ActionFilter>,
    ) {
        self.custom_attributes.set(key, value.into(), filter.into());
    }

    /// Register an extra `timeSince*` attribute
    pub fn add_time_since_entry(&mut self, entry: TimeSince) {
        self.time_since.add(entry);
    }

    /// Override the reference instant of a `timeSince*` attribute
    ///
    /// # Returns
    /// `false` if no entry emits `attribute`
    pub fn set_timestamp(&mut self, attribute: &str, instant: DateTime<Utc>) -> bool {
        self.time_since.set_reference(attribute, instant)
    }

    /// Share `correlator` with the other tracker of a pair
    pub(crate) fn link_correlator(&mut self, correlator: Arc<AdCorrelator>, paired: bool) {
        self.correlator = correlator;
        self.paired = paired;
    }

    // --- accessors ---

    pub fn role(&self) -> TrackerRole {
        self.role
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn correlator(&self) -> &Arc<AdCorrelator> {
        &self.correlator
    }

    /// Identifier of the current view, `None` outside request..end
    pub fn view_id(&self) -> Option<&str> {
        self.view_id.as_deref()
    }

    pub fn view_session(&self) -> &str {
        &self.view_session
    }

    pub fn total_playtime_ms(&self) -> i64 {
        self.total_playtime_ms
    }

    pub fn number_of_videos(&self) -> u64 {
        self.number_of_videos
    }

    /// Errors reported since the current view was requested
    pub fn number_of_errors(&self) -> u64 {
        self.number_of_errors
    }

    /// Ads seen by this pair: the ad tracker's own count, or the shared count
    /// for a content tracker
    pub fn number_of_ads(&self) -> u64 {
        match self.role {
            TrackerRole::Ad => self.number_of_ads,
            TrackerRole::Content => self.correlator.number_of_ads(),
        }
    }

    pub fn ad_break_accumulated_ms(&self) -> i64 {
        self.ad_break_accumulated_ms
    }

    /// Cause of the buffering interval in progress (or the last one)
    pub fn buffer_type(&self) -> Option<BufferType> {
        self.buffer_type
    }

    pub fn last_event_time(&self) -> Option<DateTime<Utc>> {
        self.last_event_time
    }

    /// Whether a heartbeat is due by the configured cadence
    ///
    /// Always `false` before start or when heartbeats are disabled.
    pub fn heartbeat_due(&self) -> bool {
        let Some(interval) = self.config.heartbeat_interval_ms() else {
            return false;
        };
        match (self.state.is_started(), self.heartbeat_reference) {
            (true, Some(reference)) => elapsed_ms(reference, self.clock.now()) >= interval,
            _ => false,
        }
    }

    // --- actions ---

    /// Emit TRACKER_READY
    pub fn send_tracker_ready(&mut self) -> bool {
        let before = self.state;
        let now = self.clock.now();
        self.emit(ActionKind::TrackerReady, before, now, Attributes::new())
    }

    /// Attach a player; PLAYER_READY is emitted the first time only
    pub fn set_player(&mut self, player: impl PlayerAdapter + 'static) -> bool {
        self.player = Some(Box::new(player));
        let before = self.state;
        if !self.state.go_player_ready() {
            return false;
        }
        let now = self.clock.now();
        self.emit(ActionKind::PlayerReady, before, now, Attributes::new())
    }

    /// Begin a new view
    pub fn send_request(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_request() {
            return self.absorbed(ActionKind::Request);
        }
        let now = self.clock.now();
        self.view_index += 1;
        self.view_id = Some(format!("{}-{}", self.view_session, self.view_index));
        self.number_of_errors = 0;
        self.request_time = Some(now);
        self.emit(ActionKind::Request, before, now, Attributes::new())
    }

    pub fn send_start(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_start() {
            return self.absorbed(ActionKind::Start);
        }
        let now = self.clock.now();
        self.heartbeat_reference = Some(now);
        self.emit(ActionKind::Start, before, now, Attributes::new())
    }

    pub fn send_pause(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_pause() {
            return self.absorbed(ActionKind::Pause);
        }
        let now = self.clock.now();
        self.emit(ActionKind::Pause, before, now, Attributes::new())
    }

    pub fn send_resume(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_resume() {
            return self.absorbed(ActionKind::Resume);
        }
        let now = self.clock.now();
        self.emit(ActionKind::Resume, before, now, Attributes::new())
    }

    /// Start buffering; the cause is classified now and held until
    /// [`send_buffer_end`](Self::send_buffer_end)
    pub fn send_buffer_start(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_buffer_start() {
            return self.absorbed(ActionKind::BufferStart);
        }
        let now = self.clock.now();
        let ad_break = self.role == TrackerRole::Content && self.correlator.is_ad_break_active();
        let buffer_type = BufferType::classify(&before, ad_break);
        self.buffer_type = Some(buffer_type);

        let mut extra = Attributes::new();
        extra.insert("bufferType".to_string(), buffer_type.as_str().into());
        self.emit(ActionKind::BufferStart, before, now, extra)
    }

    pub fn send_buffer_end(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_buffer_end() {
            return self.absorbed(ActionKind::BufferEnd);
        }
        let now = self.clock.now();
        let mut extra = Attributes::new();
        if let Some(buffer_type) = self.buffer_type {
            extra.insert("bufferType".to_string(), buffer_type.as_str().into());
        }
        self.emit(ActionKind::BufferEnd, before, now, extra)
    }

    pub fn send_seek_start(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_seek_start() {
            return self.absorbed(ActionKind::SeekStart);
        }
        let now = self.clock.now();
        self.emit(ActionKind::SeekStart, before, now, Attributes::new())
    }

    pub fn send_seek_end(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_seek_end() {
            return self.absorbed(ActionKind::SeekEnd);
        }
        let now = self.clock.now();
        self.emit(ActionKind::SeekEnd, before, now, Attributes::new())
    }

    /// Emit a heartbeat; requires a started view
    pub fn send_heartbeat(&mut self) -> bool {
        if !self.state.is_started() {
            return self.absorbed(ActionKind::Heartbeat);
        }
        let before = self.state;
        let now = self.clock.now();
        self.heartbeat_reference = Some(now);
        self.emit(ActionKind::Heartbeat, before, now, Attributes::new())
    }

    /// Report a rendition (quality level) switch; requires a started view
    pub fn send_rendition_change(&mut self) -> bool {
        if !self.state.is_started() {
            return self.absorbed(ActionKind::RenditionChange);
        }
        let before = self.state;
        let now = self.clock.now();
        self.emit(ActionKind::RenditionChange, before, now, Attributes::new())
    }

    pub fn send_error(&mut self) -> bool {
        self.send_error_message(None)
    }

    /// Report a playback error, optionally with a message
    pub fn send_error_message(&mut self, message: Option<&str>) -> bool {
        let before = self.state;
        let now = self.clock.now();
        self.number_of_errors += 1;
        let mut extra = Attributes::new();
        if let Some(message) = message {
            extra.insert("errorMessage".to_string(), message.into());
        }
        self.emit(ActionKind::Error, before, now, extra)
    }

    /// End the current view
    ///
    /// Carries the updated `numberOfVideos` (content) or `numberOfAds` (ad)
    /// together with `numberOfErrors`. A second end without a new request is
    /// absorbed.
    pub fn send_end(&mut self) -> bool {
        let before = self.state;
        if !self.state.go_end() {
            return self.absorbed(ActionKind::End);
        }
        let now = self.clock.now();
        let mut extra = Attributes::new();
        match self.role {
            TrackerRole::Content => {
                self.number_of_videos += 1;
                extra.insert("numberOfVideos".to_string(), self.number_of_videos.into());
            }
            TrackerRole::Ad => {
                self.number_of_ads += 1;
                self.correlator.ad_completed(now);
                if let Some(requested) = self.request_time {
                    self.ad_break_accumulated_ms += elapsed_ms(requested, now);
                }
            }
        }
        extra.insert("numberOfErrors".to_string(), self.number_of_errors.into());

        let emitted = self.emit(ActionKind::End, before, now, extra);
        self.view_id = None;
        self.heartbeat_reference = None;
        self.request_time = None;
        emitted
    }

    /// Open an ad break; ad trackers only
    pub fn send_ad_break_start(&mut self) -> bool {
        let before = self.state;
        if !self.role.is_ad() || !self.state.go_ad_break_start() {
            return self.absorbed(ActionKind::AdBreakStart);
        }
        let now = self.clock.now();
        self.correlator.ad_break_started();
        self.ad_break_accumulated_ms = 0;
        self.emit(ActionKind::AdBreakStart, before, now, Attributes::new())
    }

    /// Close an ad break, reporting `totalAdPlaytime`; ad trackers only
    pub fn send_ad_break_end(&mut self) -> bool {
        let before = self.state;
        if !self.role.is_ad() || !self.state.go_ad_break_end() {
            return self.absorbed(ActionKind::AdBreakEnd);
        }
        let now = self.clock.now();
        self.correlator.ad_break_ended();
        let mut extra = Attributes::new();
        extra.insert(
            "totalAdPlaytime".to_string(),
            self.ad_break_accumulated_ms.into(),
        );
        self.emit(ActionKind::AdBreakEnd, before, now, extra)
    }

    /// Report an ad quartile (1..=3); requires a started ad
    pub fn send_ad_quartile(&mut self, quartile: u32) -> bool {
        if !self.role.is_ad() || !self.state.is_started() {
            return self.absorbed(ActionKind::AdQuartile);
        }
        let before = self.state;
        let now = self.clock.now();
        let mut extra = Attributes::new();
        extra.insert("adQuartile".to_string(), quartile.into());
        self.emit(ActionKind::AdQuartile, before, now, extra)
    }

    /// Report a click on the ad, with the destination if known
    pub fn send_ad_click(&mut self, url: Option<&str>) -> bool {
        if !self.role.is_ad() {
            return self.absorbed(ActionKind::AdClick);
        }
        let before = self.state;
        let now = self.clock.now();
        let mut extra = Attributes::new();
        if let Some(url) = url {
            extra.insert("url".to_string(), url.into());
        }
        self.emit(ActionKind::AdClick, before, now, extra)
    }

    /// Emit a caller-named action with the standard attributes
    pub fn send_event(&mut self, name: &str) -> bool {
        self.send_event_with(name, Attributes::new())
    }

    /// Emit a caller-named action with extra attributes
    ///
    /// Built-in action names are rejected: they would stamp that action's
    /// `timeSince*` references without the matching transition.
    pub fn send_event_with(&mut self, name: &str, attributes: Attributes) -> bool {
        if is_builtin_name(name) {
            tracing::debug!(
                role = ?self.role,
                action = name,
                "Custom event uses a built-in action name, ignoring"
            );
            return false;
        }
        let before = self.state;
        let now = self.clock.now();
        self.emit(ActionKind::Custom(name.to_string()), before, now, attributes)
    }

    fn absorbed(&self, kind: ActionKind) -> bool {
        tracing::debug!(
            role = ?self.role,
            action = %Action::new(kind, self.role),
            "Transition not allowed in current state, ignoring"
        );
        false
    }

    /// Assemble attributes for an emitted action and deliver it
    ///
    /// `before` is the state prior to the transition; `now` is the single
    /// clock reading every derived attribute uses.
    fn emit(
        &mut self,
        kind: ActionKind,
        before: TrackerState,
        now: DateTime<Utc>,
        extra: Attributes,
    ) -> bool {
        let action = match kind {
            ActionKind::Custom(name) => Action::custom(name, self.role),
            kind => Action::new(kind, self.role),
        };
        let name = action.name().to_string();

        let mut attrs = Attributes::new();
        self.custom_attributes.apply(&name, &mut attrs);
        self.stamp_standard(&action, now, &mut attrs);

        // Playtime only accrues over an interval that was spent playing
        let delta = match self.playtime_mark {
            Some(mark) if before.is_playing() => elapsed_ms(mark, now),
            _ => 0,
        };
        self.total_playtime_ms += delta;
        self.playtime_mark = Some(now);
        attrs.insert("totalPlaytime".to_string(), self.total_playtime_ms.into());
        attrs.insert("playtimeSinceLastEvent".to_string(), delta.into());

        self.time_since.apply(&name, now, &mut attrs);
        attrs.extend(extra);
        self.last_event_time = Some(now);

        tracing::trace!(role = ?self.role, action = %name, "Emitting action");

        let suppressed = match self.observer.as_mut() {
            Some(observer) => observer.observe(&action, &mut attrs),
            None => false,
        };
        if !suppressed && self.config.forward_events {
            self.sink.record(VideoEvent {
                event_type: action.event_type(),
                action: name,
                timestamp: now,
                attributes: attrs,
            });
        }
        true
    }

    fn stamp_standard(&self, action: &Action, now: DateTime<Utc>, attrs: &mut Attributes) {
        attrs.insert("trackerName".to_string(), self.config.tracker_name.as_str().into());
        attrs.insert(
            "trackerVersion".to_string(),
            self.config.tracker_version.as_str().into(),
        );
        attrs.insert("coreVersion".to_string(), crate::VERSION.into());
        attrs.insert("isAd".to_string(), self.role.is_ad().into());
        attrs.insert("viewSession".to_string(), self.view_session.as_str().into());
        if let Some(view_id) = &self.view_id {
            attrs.insert("viewId".to_string(), view_id.as_str().into());
        }

        let player_name = self
            .player
            .as_ref()
            .and_then(|p| p.player_name())
            .or_else(|| self.config.player_name.clone());
        if let Some(player_name) = player_name {
            attrs.insert("playerName".to_string(), player_name.into());
        }
        if let Some(player) = &self.player {
            stamp_player_attributes(player.as_ref(), self.role.attribute_prefix(), attrs);
        }

        match self.role {
            TrackerRole::Ad => {
                attrs.insert("numberOfAds".to_string(), self.number_of_ads.into());
            }
            TrackerRole::Content => {
                let correlated = matches!(
                    action.kind(),
                    ActionKind::Start | ActionKind::BufferStart | ActionKind::BufferEnd | ActionKind::End
                );
                if self.paired && correlated {
                    attrs.insert(
                        "numberOfAds".to_string(),
                        self.correlator.number_of_ads().into(),
                    );
                }
                if let Some(last_ad_end) = self.correlator.last_ad_end() {
                    attrs.insert(
                        "timeSinceLastAd".to_string(),
                        elapsed_ms(last_ad_end, now).into(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::clock::ManualClock;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<(String, Attributes)>>>;

    fn tracker(role: TrackerRole) -> (Tracker, ManualClock, Log) {
        let clock = ManualClock::new();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let tracker = Tracker::new(role)
            .with_clock(Arc::new(clock.clone()))
            .with_sink(Arc::new(crate::event::sink::NullSink))
            .with_observer(move |action: &Action, attrs: &mut Attributes| {
                sink.lock().push((action.name().to_string(), attrs.clone()));
                true
            });
        (tracker, clock, log)
    }

    fn names(log: &Log) -> Vec<String> {
        log.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    fn last_i64(log: &Log, key: &str) -> Option<i64> {
        log.lock().last().and_then(|(_, a)| a.get(key)).and_then(|v| v.as_i64())
    }

    #[test]
    fn test_duplicate_request_absorbed() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        assert!(t.send_request());
        assert!(!t.send_request());
        assert!(t.send_start());
        assert!(!t.send_start());
        assert!(t.send_end());
        assert!(!t.send_end());
        assert_eq!(names(&log), vec!["CONTENT_REQUEST", "CONTENT_START", "CONTENT_END"]);
    }

    #[test]
    fn test_start_before_request_absorbed() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        assert!(!t.send_start());
        assert!(!t.send_pause());
        assert!(!t.send_heartbeat());
        assert!(log.lock().is_empty());
        assert_eq!(t.state(), TrackerState::new());
    }

    #[test]
    fn test_view_id_per_request() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        let first = t.view_id().map(str::to_string);
        t.send_end();
        assert!(t.view_id().is_none());
        t.send_request();
        let second = t.view_id().map(str::to_string);
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
        let logged = log.lock()[2].1.get("viewId").and_then(|v| v.as_str()).map(str::to_string);
        assert_eq!(logged, second);
    }

    #[test]
    fn test_time_since_requested() {
        let (mut t, clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        clock.advance_ms(1100);
        t.send_start();
        assert_eq!(last_i64(&log, "timeSinceRequested"), Some(1100));
    }

    #[test]
    fn test_playtime_accounting() {
        let (mut t, clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        clock.advance_ms(300);
        t.send_start();
        assert_eq!(last_i64(&log, "playtimeSinceLastEvent"), Some(0));

        clock.advance_ms(1000);
        t.send_pause();
        assert_eq!(last_i64(&log, "playtimeSinceLastEvent"), Some(1000));
        assert_eq!(last_i64(&log, "totalPlaytime"), Some(1000));

        clock.advance_ms(1000);
        t.send_resume();
        assert_eq!(last_i64(&log, "playtimeSinceLastEvent"), Some(0));
        assert_eq!(last_i64(&log, "totalPlaytime"), Some(1000));

        clock.advance_ms(1000);
        t.send_heartbeat();
        assert_eq!(last_i64(&log, "playtimeSinceLastEvent"), Some(1000));
        assert_eq!(last_i64(&log, "totalPlaytime"), Some(2000));
        assert_eq!(t.total_playtime_ms(), 2000);
    }

    #[test]
    fn test_buffer_type_held_until_end() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        t.send_start();
        t.send_pause();
        t.send_buffer_start();
        t.send_resume();
        t.send_buffer_end();

        let log = log.lock();
        let types: Vec<_> = log
            .iter()
            .filter_map(|(_, a)| a.get("bufferType").and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        assert_eq!(types, vec!["pause", "pause"]);
    }

    #[test]
    fn test_error_counter_per_view() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        t.send_error();
        t.send_error_message(Some("decoder failed"));
        t.send_start();
        t.send_end();
        assert_eq!(last_i64(&log, "numberOfErrors"), Some(2));
        assert_eq!(last_i64(&log, "numberOfVideos"), Some(1));

        t.send_request();
        assert_eq!(t.number_of_errors(), 0);

        let log = log.lock();
        let messages: Vec<_> = log
            .iter()
            .filter(|(name, _)| name == "CONTENT_ERROR")
            .map(|(_, a)| a.get("errorMessage").and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        assert_eq!(messages, vec![None, Some("decoder failed".to_string())]);
    }

    #[test]
    fn test_ad_break_only_on_ad_tracker() {
        let (mut content, _clock, log) = tracker(TrackerRole::Content);
        assert!(!content.send_ad_break_start());
        assert!(!content.send_ad_quartile(1));
        assert!(log.lock().is_empty());

        let (mut ad, clock, log) = tracker(TrackerRole::Ad);
        assert!(ad.send_ad_break_start());
        assert!(ad.correlator().is_ad_break_active());
        ad.send_request();
        clock.advance_ms(500);
        ad.send_start();
        assert!(ad.send_ad_quartile(1));
        ad.send_end();
        assert!(ad.send_ad_break_end());

        assert_eq!(last_i64(&log, "totalAdPlaytime"), Some(500));
        assert_eq!(last_i64(&log, "timeSinceAdBreakBegin"), Some(500));
        assert_eq!(ad.number_of_ads(), 1);
        assert!(!ad.correlator().is_ad_break_active());
    }

    #[test]
    fn test_observer_suppresses_sink_only() {
        let (sink, rx) = crate::event::sink::ChannelSink::unbounded();
        let mut t = Tracker::content()
            .with_sink(Arc::new(sink))
            .with_observer(|action: &Action, _: &mut Attributes| action.name() == "CONTENT_REQUEST");
        assert!(t.send_request());
        assert!(t.state().is_requested());
        assert!(t.send_start());

        let forwarded: Vec<_> = rx.try_iter().map(|e| e.action).collect();
        assert_eq!(forwarded, vec!["CONTENT_START"]);
    }

    #[test]
    fn test_forward_events_disabled() {
        let (sink, rx) = crate::event::sink::ChannelSink::unbounded();
        let config = TrackerConfig {
            forward_events: false,
            ..Default::default()
        };
        let mut t = Tracker::content().with_sink(Arc::new(sink)).with_config(config);
        assert!(t.send_request());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_custom_attributes_and_events() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        t.set_attribute("customerId", "abc");
        t.set_attribute_for("onlyOnStart", 7, "CONTENT_START");
        t.send_request();
        t.send_start();
        t.send_event("CHAPTER_CHANGE");

        let log = log.lock();
        assert_eq!(log[0].1.get("customerId").and_then(|v| v.as_str()), Some("abc"));
        assert!(!log[0].1.contains_key("onlyOnStart"));
        assert_eq!(log[1].1.get("onlyOnStart").and_then(|v| v.as_i64()), Some(7));
        assert_eq!(log[2].0, "CHAPTER_CHANGE");
        assert!(log[2].1.contains_key("totalPlaytime"));
    }

    #[test]
    fn test_player_ready_once() {
        let (mut t, _clock, log) = tracker(TrackerRole::Content);
        assert!(t.set_player(|| Some(1234i64)));
        assert!(!t.set_player(|| Some(99i64)));
        t.send_request();
        assert_eq!(names(&log), vec!["PLAYER_READY", "CONTENT_REQUEST"]);
        assert_eq!(last_i64(&log, "contentPlayhead"), Some(99));
    }

    #[test]
    fn test_heartbeat_due() {
        let (mut t, clock, _log) = tracker(TrackerRole::Content);
        assert!(!t.heartbeat_due());
        t.send_request();
        t.send_start();
        clock.advance_ms(29_999);
        assert!(!t.heartbeat_due());
        clock.advance_ms(1);
        assert!(t.heartbeat_due());
        t.send_heartbeat();
        assert!(!t.heartbeat_due());
    }

    #[test]
    fn test_set_timestamp() {
        let (mut t, clock, log) = tracker(TrackerRole::Content);
        let origin = clock.now();
        assert!(t.set_timestamp("timeSinceLastHeartbeat", origin));
        assert!(!t.set_timestamp("timeSinceNothing", origin));

        clock.advance_ms(250);
        t.send_request();
        assert_eq!(last_i64(&log, "timeSinceLastHeartbeat"), Some(250));
    }

    #[test]
    fn test_custom_time_since_entry() {
        let (mut t, clock, log) = tracker(TrackerRole::Content);
        t.add_time_since_entry(TimeSince::new("CHAPTER_MARK", "timeSinceChapter", "CONTENT_*"));
        t.send_event("CHAPTER_MARK");
        clock.advance_ms(40);
        t.send_request();
        assert_eq!(last_i64(&log, "timeSinceChapter"), Some(40));
    }

    #[test]
    fn test_custom_event_with_builtin_name_rejected() {
        let (mut t, clock, log) = tracker(TrackerRole::Content);
        t.send_request();
        clock.advance_ms(1000);
        assert!(!t.send_event(crate::event::action::CONTENT_REQUEST));
        clock.advance_ms(100);
        t.send_start();

        assert_eq!(names(&log), vec!["CONTENT_REQUEST", "CONTENT_START"]);
        assert_eq!(last_i64(&log, "timeSinceRequested"), Some(1100));
    }
}

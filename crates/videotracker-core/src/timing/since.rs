//! Time-since attribute table
//!
//! Each entry remembers when its trigger action was last emitted and, on
//! every action its filter matches, attaches the elapsed milliseconds under
//! its attribute name. An entry whose trigger has never fired attaches
//! nothing.

use chrono::{DateTime, Utc};

use super::elapsed_ms;
use crate::event::action::*;
use crate::event::attributes::{ActionFilter, Attributes};

/// One `timeSince*` attribute definition
#[derive(Debug, Clone)]
pub struct TimeSince {
    /// Action that resets the reference instant
    trigger: String,
    /// Attribute name to emit
    attribute: String,
    /// Actions the attribute is attached to
    filter: ActionFilter,
    /// Last time the trigger fired (or an externally set instant)
    reference: Option<DateTime<Utc>>,
}

impl TimeSince {
    /// Create an entry
    ///
    /// # Arguments
    /// * `trigger` - Action name that stamps the reference instant
    /// * `attribute` - Attribute name, e.g. `timeSinceRequested`
    /// * `filter` - Actions the attribute is attached to
    pub fn new(trigger: &str, attribute: &str, filter: impl Into<ActionFilter>) -> Self {
        Self {
            trigger: trigger.to_string(),
            attribute: attribute.to_string(),
            filter: filter.into(),
            reference: None,
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute
    }

    /// Whether `action` stamps this entry's reference instant
    pub fn is_action(&self, action: &str) -> bool {
        self.trigger == action
    }

    /// Whether this entry's attribute is attached to `action`
    pub fn is_match(&self, action: &str) -> bool {
        self.filter.matches(action)
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.reference = Some(now);
    }

    /// Milliseconds since the reference instant, if it was ever stamped
    pub fn time_since(&self, now: DateTime<Utc>) -> Option<i64> {
        self.reference.map(|reference| elapsed_ms(reference, now))
    }
}

/// Ordered set of [`TimeSince`] entries owned by one tracker
#[derive(Debug, Clone, Default)]
pub struct TimeSinceTable {
    entries: Vec<TimeSince>,
}

impl TimeSinceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table used by content trackers
    pub fn content_defaults() -> Self {
        let mut table = Self::new();
        table.add_entry(CONTENT_REQUEST, "timeSinceRequested", CONTENT_START);
        table.add_entry(CONTENT_START, "timeSinceStarted", CONTENT_END);
        table.add_entry(CONTENT_PAUSE, "timeSincePaused", CONTENT_RESUME);
        table.add_entry(CONTENT_BUFFER_START, "timeSinceBufferBegin", CONTENT_BUFFER_END);
        table.add_entry(CONTENT_SEEK_START, "timeSinceSeekBegin", CONTENT_SEEK_END);
        table.add_entry(CONTENT_HEARTBEAT, "timeSinceLastHeartbeat", "CONTENT_*");
        table.add_entry(
            CONTENT_RENDITION_CHANGE,
            "timeSinceLastRenditionChange",
            CONTENT_RENDITION_CHANGE,
        );
        table
    }

    /// Table used by ad trackers
    pub fn ad_defaults() -> Self {
        let mut table = Self::new();
        table.add_entry(AD_REQUEST, "timeSinceRequested", AD_START);
        table.add_entry(AD_REQUEST, "timeSinceAdRequested", AD_END);
        table.add_entry(AD_START, "timeSinceAdStarted", AD_END);
        table.add_entry(AD_PAUSE, "timeSinceAdPaused", AD_RESUME);
        table.add_entry(AD_BUFFER_START, "timeSinceAdBufferBegin", AD_BUFFER_END);
        table.add_entry(AD_SEEK_START, "timeSinceAdSeekBegin", AD_SEEK_END);
        table.add_entry(AD_HEARTBEAT, "timeSinceLastAdHeartbeat", "AD_*");
        table.add_entry(
            AD_RENDITION_CHANGE,
            "timeSinceLastAdRenditionChange",
            AD_RENDITION_CHANGE,
        );
        table.add_entry(AD_BREAK_START, "timeSinceAdBreakBegin", AD_BREAK_END);
        table.add_entry(AD_QUARTILE, "timeSinceLastAdQuartile", AD_QUARTILE);
        table
    }

    pub fn add_entry(&mut self, trigger: &str, attribute: &str, filter: impl Into<ActionFilter>) {
        self.entries.push(TimeSince::new(trigger, attribute, filter));
    }

    pub fn add(&mut self, entry: TimeSince) {
        self.entries.push(entry);
    }

    /// Attach every matching attribute for `action`, then stamp the entries
    /// it triggers
    ///
    /// An entry whose trigger and filter both match reports the interval
    /// since its previous trigger before being re-stamped.
    pub fn apply(&mut self, action: &str, now: DateTime<Utc>, attrs: &mut Attributes) {
        for entry in &mut self.entries {
            if entry.is_match(action) {
                if let Some(ms) = entry.time_since(now) {
                    attrs.insert(entry.attribute.clone(), ms.into());
                }
            }
            if entry.is_action(action) {
                entry.mark(now);
            }
        }
    }

    /// Override the reference instant of every entry emitting `attribute`
    ///
    /// # Returns
    /// `false` if no entry emits that attribute
    pub fn set_reference(&mut self, attribute: &str, instant: DateTime<Utc>) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.attribute == attribute) {
            entry.mark(instant);
            found = true;
        }
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

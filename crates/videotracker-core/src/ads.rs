//! Ad correlation between a content tracker and its ad tracker
//!
//! Both trackers of a session share one [`AdCorrelator`]. The ad tracker
//! writes to it (break boundaries, completed ads); the content tracker reads
//! it when building attributes and when classifying buffering. The
//! correlator holds no lock across tracker calls, so the two trackers never
//! wait on each other.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::tracker::state::TrackerState;

/// Cause attributed to a buffering interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferType {
    /// Before playback of the current view started
    Initial,
    /// During normal playback
    Connection,
    /// While paused
    Pause,
    /// While seeking
    Seek,
    /// While an ad break is active
    Ad,
}

impl BufferType {
    /// Classify a buffering interval starting now
    ///
    /// An active ad break overrides the tracker's own state; otherwise the
    /// first matching rule of started, paused, seeking wins.
    pub fn classify(state: &TrackerState, ad_break_active: bool) -> Self {
        if ad_break_active {
            BufferType::Ad
        } else if !state.is_started() {
            BufferType::Initial
        } else if state.is_paused() {
            BufferType::Pause
        } else if state.is_seeking() {
            BufferType::Seek
        } else {
            BufferType::Connection
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BufferType::Initial => "initial",
            BufferType::Connection => "connection",
            BufferType::Pause => "pause",
            BufferType::Seek => "seek",
            BufferType::Ad => "ad",
        }
    }
}

impl std::fmt::Display for BufferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared ad-break view for one content/ad tracker pair
#[derive(Debug, Default)]
pub struct AdCorrelator {
    /// An ad break is in progress
    ad_break_active: AtomicBool,
    /// Ads completed since the pair was created
    number_of_ads: AtomicU64,
    /// When the most recent ad ended
    last_ad_end: Mutex<Option<DateTime<Utc>>>,
}

impl AdCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ad_break_started(&self) {
        self.ad_break_active.store(true, Ordering::SeqCst);
    }

    pub fn ad_break_ended(&self) {
        self.ad_break_active.store(false, Ordering::SeqCst);
    }

    pub fn is_ad_break_active(&self) -> bool {
        self.ad_break_active.load(Ordering::SeqCst)
    }

    /// Record a completed ad
    ///
    /// # Returns
    /// Number of ads completed so far, including this one
    pub fn ad_completed(&self, at: DateTime<Utc>) -> u64 {
        *self.last_ad_end.lock() = Some(at);
        self.number_of_ads.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn number_of_ads(&self) -> u64 {
        self.number_of_ads.load(Ordering::SeqCst)
    }

    pub fn last_ad_end(&self) -> Option<DateTime<Utc>> {
        *self.last_ad_end.lock()
    }
}

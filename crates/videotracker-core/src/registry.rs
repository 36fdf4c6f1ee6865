//! Session registry
//!
//! Maps an opaque [`SessionId`] to a content tracker and an optional ad
//! tracker. Lookups take a read lock and may run concurrently; `start` and
//! `release` take the write lock. Trackers themselves are locked separately,
//! so driving one session never blocks another.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::ads::AdCorrelator;
use crate::tracker::handle::TrackerHandle;
use crate::tracker::Tracker;

/// Opaque session identifier, never reused by a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct TrackerPair {
    content: TrackerHandle,
    ad: Option<TrackerHandle>,
}

/// Table of live tracker pairs
pub struct TrackerRegistry {
    sessions: RwLock<HashMap<SessionId, TrackerPair>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for TrackerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerRegistry")
            .field("sessions", &self.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static TrackerRegistry {
        static GLOBAL: OnceLock<TrackerRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TrackerRegistry::new)
    }

    /// Register a tracker pair and fire TRACKER_READY on the content tracker
    ///
    /// Both trackers are linked to a fresh [`AdCorrelator`] so the content
    /// side sees ad breaks and ad counts reported by the ad side.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use videotracker_core::{NullSink, Tracker, TrackerRegistry};
    ///
    /// let registry = TrackerRegistry::new();
    /// let id = registry.start(Tracker::content().with_sink(Arc::new(NullSink)), None);
    /// assert!(registry.content_tracker(id).is_some());
    /// registry.release(id);
    /// assert!(registry.content_tracker(id).is_none());
    /// ```
    pub fn start(&self, mut content: Tracker, ad: Option<Tracker>) -> SessionId {
        let correlator = Arc::new(AdCorrelator::new());
        let paired = ad.is_some();
        content.link_correlator(correlator.clone(), paired);
        let ad = ad.map(|mut ad| {
            ad.link_correlator(correlator, true);
            TrackerHandle::new(ad)
        });
        let content = TrackerHandle::new(content);

        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sessions.write().insert(
            id,
            TrackerPair {
                content: content.clone(),
                ad,
            },
        );
        tracing::info!(session = %id, with_ad = paired, "Tracker session started");

        content.send_tracker_ready();
        id
    }

    /// Content tracker of a live session
    pub fn content_tracker(&self, id: SessionId) -> Option<TrackerHandle> {
        self.sessions.read().get(&id).map(|pair| pair.content.clone())
    }

    /// Ad tracker of a live session, if it has one
    pub fn ad_tracker(&self, id: SessionId) -> Option<TrackerHandle> {
        self.sessions.read().get(&id).and_then(|pair| pair.ad.clone())
    }

    /// Drop a session; later lookups of `id` return `None`
    ///
    /// Does not end an in-progress view. Handles still held by callers stay
    /// usable but are no longer reachable through the registry.
    ///
    /// # Returns
    /// `false` if `id` was unknown or already released
    pub fn release(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, "Tracker session released");
        } else {
            tracing::debug!(session = %id, "Release of unknown session ignored");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Ids of every live session, in ascending order
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.read().keys().copied().collect();
        ids.sort();
        ids
    }
}

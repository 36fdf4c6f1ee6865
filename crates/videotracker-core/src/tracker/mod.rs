//! Content and ad trackers
//!
//! - Guarded action dispatch and attribute assembly ([`dispatch`])
//! - Thread-safe shared handle ([`handle`])
//! - Player adapter contract ([`player`])
//! - State vector and transition guards ([`state`])

pub mod dispatch;
pub mod handle;
pub mod player;
pub mod state;

pub use dispatch::Tracker;

use serde::{Deserialize, Serialize};

/// Which half of a session a tracker reports on
///
/// Both roles share the same state machine and timing; the role selects the
/// action vocabulary (`CONTENT_*` or `AD_*`) and the attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerRole {
    Content,
    Ad,
}

impl TrackerRole {
    /// Prefix for player-derived attribute names
    pub fn attribute_prefix(&self) -> &'static str {
        match self {
            TrackerRole::Content => "content",
            TrackerRole::Ad => "ad",
        }
    }

    pub fn is_ad(&self) -> bool {
        *self == TrackerRole::Ad
    }
}

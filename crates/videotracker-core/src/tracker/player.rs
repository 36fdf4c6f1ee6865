//! Player adapter contract
//!
//! A tracker polls its player opportunistically to stamp descriptive
//! attributes on emitted actions. Nothing read from the player ever drives a
//! state transition.

use crate::event::attributes::Attributes;

/// Read-only view of a platform player
///
/// Only the playhead is required; every other getter defaults to "unknown"
/// and the matching attribute is then left out.
pub trait PlayerAdapter: Send {
    /// Current playback position in milliseconds
    fn playhead(&self) -> Option<i64>;

    fn player_name(&self) -> Option<String> {
        None
    }

    fn player_version(&self) -> Option<String> {
        None
    }

    /// Media duration in milliseconds
    fn duration(&self) -> Option<i64> {
        None
    }

    /// Current bitrate in bits per second
    fn bitrate(&self) -> Option<i64> {
        None
    }

    fn rendition_width(&self) -> Option<i64> {
        None
    }

    fn rendition_height(&self) -> Option<i64> {
        None
    }

    fn title(&self) -> Option<String> {
        None
    }

    /// Media source, usually a URL
    fn src(&self) -> Option<String> {
        None
    }

    fn language(&self) -> Option<String> {
        None
    }

    fn is_live(&self) -> Option<bool> {
        None
    }

    fn is_muted(&self) -> Option<bool> {
        None
    }

    fn fps(&self) -> Option<f64> {
        None
    }
}

/// Placeholder player that knows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayer;

impl PlayerAdapter for NullPlayer {
    fn playhead(&self) -> Option<i64> {
        None
    }
}

/// A closure returning the playhead is a minimal player
impl<F> PlayerAdapter for F
where
    F: Fn() -> Option<i64> + Send,
{
    fn playhead(&self) -> Option<i64> {
        self()
    }
}

/// Stamp everything the player knows onto `attrs`
///
/// # Arguments
/// * `player` - Player to poll
/// * `prefix` - `content` or `ad`; attribute names are `<prefix>Playhead` etc.
/// * `attrs` - Attribute bag being built
pub(crate) fn stamp_player_attributes(
    player: &dyn PlayerAdapter,
    prefix: &str,
    attrs: &mut Attributes,
) {
    let mut put = |name: &str, value: Option<crate::event::attributes::AttributeValue>| {
        if let Some(value) = value {
            attrs.insert(format!("{prefix}{name}"), value);
        }
    };

    put("Playhead", player.playhead().map(Into::into));
    put("Duration", player.duration().map(Into::into));
    put("Bitrate", player.bitrate().map(Into::into));
    put("RenditionWidth", player.rendition_width().map(Into::into));
    put("RenditionHeight", player.rendition_height().map(Into::into));
    put("Title", player.title().map(Into::into));
    put("Src", player.src().map(Into::into));
    put("Language", player.language().map(Into::into));
    put("IsLive", player.is_live().map(Into::into));
    put("IsMuted", player.is_muted().map(Into::into));
    put("Fps", player.fps().map(Into::into));

    if let Some(version) = player.player_version() {
        attrs.insert("playerVersion".to_string(), version.into());
    }
}

//! Tracker state vector
//!
//! Each `go_*` method checks the precondition of one transition and applies
//! it. A `false` return means the call was redundant in the current state and
//! nothing changed; the tracker then emits nothing.

/// Playback state of one tracker
///
/// `buffering` and `seeking` are independent flags and may combine with
/// `paused`. Ending a view clears every flag except `player_ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerState {
    player_ready: bool,
    requested: bool,
    started: bool,
    paused: bool,
    buffering: bool,
    seeking: bool,
    ad_break: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_player_ready(&self) -> bool {
        self.player_ready
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    pub fn is_ad_break(&self) -> bool {
        self.ad_break
    }

    /// Playback is actually progressing
    pub fn is_playing(&self) -> bool {
        self.started && !self.paused && !self.buffering && !self.seeking
    }

    pub fn go_player_ready(&mut self) -> bool {
        if self.player_ready {
            return false;
        }
        self.player_ready = true;
        true
    }

    pub fn go_request(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        true
    }

    pub fn go_start(&mut self) -> bool {
        if !self.requested || self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub fn go_pause(&mut self) -> bool {
        if !self.started || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    pub fn go_resume(&mut self) -> bool {
        if !self.started || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    pub fn go_buffer_start(&mut self) -> bool {
        if self.buffering {
            return false;
        }
        self.buffering = true;
        true
    }

    pub fn go_buffer_end(&mut self) -> bool {
        if !self.buffering {
            return false;
        }
        self.buffering = false;
        true
    }

    pub fn go_seek_start(&mut self) -> bool {
        if self.seeking {
            return false;
        }
        self.seeking = true;
        true
    }

    pub fn go_seek_end(&mut self) -> bool {
        if !self.seeking {
            return false;
        }
        self.seeking = false;
        true
    }

    /// End the current view
    ///
    /// Applies once per request; a second end without a new request is
    /// absorbed.
    pub fn go_end(&mut self) -> bool {
        if !self.requested {
            return false;
        }
        self.requested = false;
        self.started = false;
        self.paused = false;
        self.buffering = false;
        self.seeking = false;
        true
    }

    pub fn go_ad_break_start(&mut self) -> bool {
        if self.ad_break {
            return false;
        }
        self.ad_break = true;
        true
    }

    pub fn go_ad_break_end(&mut self) -> bool {
        if !self.ad_break {
            return false;
        }
        self.ad_break = false;
        true
    }
}

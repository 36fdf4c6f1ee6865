//! Shared tracker handle
//!
//! [`TrackerHandle`] wraps a [`Tracker`] in a `Mutex` so any thread may drive
//! it. Each call takes the lock exactly once, runs the action and releases;
//! there is no nested locking, so calls on different trackers never contend.

use parking_lot::Mutex;
use std::sync::Arc;

use super::dispatch::Tracker;
use super::player::PlayerAdapter;
use super::state::TrackerState;
use super::TrackerRole;
use crate::event::attributes::{AttributeValue, Attributes};

/// Cloneable, thread-safe reference to one tracker
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    inner: Arc<Mutex<Tracker>>,
}

impl TrackerHandle {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Runs a closure with exclusive access to the tracker
    ///
    /// The closure must not call back into this handle.
    pub fn with_tracker<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Tracker) -> R,
    {
        let mut tracker = self.inner.lock();
        f(&mut tracker)
    }

    /// Whether both handles refer to the same tracker
    pub fn ptr_eq(&self, other: &TrackerHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn role(&self) -> TrackerRole {
        self.inner.lock().role()
    }

    /// Snapshot of the current state vector
    pub fn state(&self) -> TrackerState {
        self.inner.lock().state()
    }

    pub fn view_id(&self) -> Option<String> {
        self.inner.lock().view_id().map(str::to_string)
    }

    pub fn total_playtime_ms(&self) -> i64 {
        self.inner.lock().total_playtime_ms()
    }

    pub fn number_of_videos(&self) -> u64 {
        self.inner.lock().number_of_videos()
    }

    pub fn number_of_errors(&self) -> u64 {
        self.inner.lock().number_of_errors()
    }

    pub fn number_of_ads(&self) -> u64 {
        self.inner.lock().number_of_ads()
    }

    pub fn heartbeat_due(&self) -> bool {
        self.inner.lock().heartbeat_due()
    }

    pub fn set_attribute(&self, key: &str, value: impl Into<AttributeValue>) {
        self.inner.lock().set_attribute(key, value);
    }

    pub fn set_player(&self, player: impl PlayerAdapter + 'static) -> bool {
        self.inner.lock().set_player(player)
    }

    pub fn send_tracker_ready(&self) -> bool {
        self.inner.lock().send_tracker_ready()
    }

    pub fn send_request(&self) -> bool {
        self.inner.lock().send_request()
    }

    pub fn send_start(&self) -> bool {
        self.inner.lock().send_start()
    }

    pub fn send_pause(&self) -> bool {
        self.inner.lock().send_pause()
    }

    pub fn send_resume(&self) -> bool {
        self.inner.lock().send_resume()
    }

    pub fn send_buffer_start(&self) -> bool {
        self.inner.lock().send_buffer_start()
    }

    pub fn send_buffer_end(&self) -> bool {
        self.inner.lock().send_buffer_end()
    }

    pub fn send_seek_start(&self) -> bool {
        self.inner.lock().send_seek_start()
    }

    pub fn send_seek_end(&self) -> bool {
        self.inner.lock().send_seek_end()
    }

    pub fn send_heartbeat(&self) -> bool {
        self.inner.lock().send_heartbeat()
    }

    pub fn send_rendition_change(&self) -> bool {
        self.inner.lock().send_rendition_change()
    }

    pub fn send_error(&self) -> bool {
        self.inner.lock().send_error()
    }

    pub fn send_error_message(&self, message: Option<&str>) -> bool {
        self.inner.lock().send_error_message(message)
    }

    pub fn send_end(&self) -> bool {
        self.inner.lock().send_end()
    }

    pub fn send_ad_break_start(&self) -> bool {
        self.inner.lock().send_ad_break_start()
    }

    pub fn send_ad_break_end(&self) -> bool {
        self.inner.lock().send_ad_break_end()
    }

    pub fn send_ad_quartile(&self, quartile: u32) -> bool {
        self.inner.lock().send_ad_quartile(quartile)
    }

    pub fn send_ad_click(&self, url: Option<&str>) -> bool {
        self.inner.lock().send_ad_click(url)
    }

    pub fn send_event(&self, name: &str) -> bool {
        self.inner.lock().send_event(name)
    }

    pub fn send_event_with(&self, name: &str, attributes: Attributes) -> bool {
        self.inner.lock().send_event_with(name, attributes)
    }
}

impl From<Tracker> for TrackerHandle {
    fn from(tracker: Tracker) -> Self {
        Self::new(tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::sink::NullSink;

    #[test]
    fn test_clones_share_tracker() {
        let handle = TrackerHandle::new(Tracker::content().with_sink(Arc::new(NullSink)));
        let other = handle.clone();
        assert!(handle.ptr_eq(&other));

        assert!(handle.send_request());
        assert!(!other.send_request());
        assert!(other.state().is_requested());
        assert_eq!(handle.view_id(), other.view_id());
    }

    #[test]
    fn test_concurrent_calls_serialized() {
        let (sink, rx) = crate::event::sink::ChannelSink::unbounded();
        let handle = TrackerHandle::new(Tracker::content().with_sink(Arc::new(sink)));
        handle.send_request();
        handle.send_start();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        handle.send_pause();
                        handle.send_resume();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let actions: Vec<_> = rx.try_iter().map(|e| e.action).skip(2).collect();
        assert!(!actions.is_empty());
        for pair in actions.windows(2) {
            assert_ne!(pair[0], pair[1], "pause/resume must alternate");
        }
        assert_eq!(actions[0], "CONTENT_PAUSE");
    }

    #[test]
    fn test_with_tracker() {
        let handle: TrackerHandle = Tracker::ad().with_sink(Arc::new(NullSink)).into();
        let role = handle.with_tracker(|t| {
            t.send_ad_break_start();
            t.role()
        });
        assert_eq!(role, TrackerRole::Ad);
        assert!(handle.state().is_ad_break());
    }
}

//! E2E tests for tracker configuration
//!
//! Tests config persistence and how config fields reach emitted events.

use std::sync::Arc;
use videotracker::{ChannelSink, ManualClock, Tracker, TrackerConfig};

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("videotracker").join("config.json");

    let config = TrackerConfig {
        tracker_name: "avplayer-tracker".to_string(),
        player_name: Some("AVPlayer".to_string()),
        heartbeat_interval_secs: 10,
        ..Default::default()
    };
    config.save(&path).unwrap();
    assert_eq!(TrackerConfig::load(&path), config);
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrackerConfig::load(&dir.path().join("nope.json"));
    assert_eq!(config, TrackerConfig::default());
    assert!(TrackerConfig::try_load(&dir.path().join("nope.json")).is_err());
}

#[test]
fn test_config_backward_compatible() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"tracker_name": "old", "unknown_field": 1}"#).unwrap();

    let config = TrackerConfig::try_load(&path).unwrap();
    assert_eq!(config.tracker_name, "old");
    assert_eq!(config.heartbeat_interval_secs, videotracker::DEFAULT_HEARTBEAT_SECS);
    assert!(config.forward_events);
}

#[test]
fn test_config_names_reach_events() {
    let (sink, rx) = ChannelSink::unbounded();
    let config = TrackerConfig {
        tracker_name: "demo-tracker".to_string(),
        tracker_version: "9.9.9".to_string(),
        player_name: Some("DemoPlayer".to_string()),
        ..Default::default()
    };
    let mut tracker = Tracker::content()
        .with_config(config)
        .with_sink(Arc::new(sink));
    tracker.send_request();

    let event = rx.try_recv().unwrap();
    let get = |key: &str| event.attributes.get(key).and_then(|v| v.as_str()).map(str::to_string);
    assert_eq!(get("trackerName").as_deref(), Some("demo-tracker"));
    assert_eq!(get("trackerVersion").as_deref(), Some("9.9.9"));
    assert_eq!(get("playerName").as_deref(), Some("DemoPlayer"));
    assert_eq!(get("coreVersion").as_deref(), Some(videotracker::VERSION));
}

#[test]
fn test_heartbeat_cadence_from_config() {
    let clock = ManualClock::new();
    let config = TrackerConfig {
        heartbeat_interval_secs: 5,
        ..Default::default()
    };
    let mut tracker = Tracker::content()
        .with_config(config)
        .with_clock(Arc::new(clock.clone()))
        .with_sink(Arc::new(videotracker::NullSink));
    tracker.send_request();
    tracker.send_start();

    clock.advance_ms(4_999);
    assert!(!tracker.heartbeat_due());
    clock.advance_ms(1);
    assert!(tracker.heartbeat_due());

    let disabled = TrackerConfig {
        heartbeat_interval_secs: 0,
        ..Default::default()
    };
    let mut tracker = Tracker::content()
        .with_config(disabled)
        .with_clock(Arc::new(clock.clone()))
        .with_sink(Arc::new(videotracker::NullSink));
    tracker.send_request();
    tracker.send_start();
    clock.advance_ms(1_000_000);
    assert!(!tracker.heartbeat_due());
}

#[test]
fn test_huge_heartbeat_interval_never_due() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"heartbeat_interval_secs": 10000000000000000}"#).unwrap();
    let config = TrackerConfig::try_load(&path).unwrap();
    assert_eq!(config.heartbeat_interval_ms(), Some(i64::MAX));

    let clock = ManualClock::new();
    let mut tracker = Tracker::content()
        .with_config(config)
        .with_clock(Arc::new(clock.clone()))
        .with_sink(Arc::new(videotracker::NullSink));
    tracker.send_request();
    tracker.send_start();
    assert!(!tracker.heartbeat_due());
    clock.advance_ms(86_400_000);
    assert!(!tracker.heartbeat_due(), "saturated interval must not wrap");
}

#[test]
fn test_forwarding_disabled_by_config() {
    let (sink, rx) = ChannelSink::unbounded();
    let config = TrackerConfig {
        forward_events: false,
        ..Default::default()
    };
    let mut tracker = Tracker::content()
        .with_config(config)
        .with_sink(Arc::new(sink));
    assert!(tracker.send_request());
    assert!(tracker.send_start());
    assert_eq!(rx.try_iter().count(), 0);
}

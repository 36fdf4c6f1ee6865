//! Videotracker demo
//!
//! Drives a scripted content + ad session from a worker thread and logs
//! every forwarded event.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use videotracker::{
    PlayerAdapter, SessionId, Tracker, TrackerConfig, TrackerRegistry, TracingSink,
};

/// Playhead source for the demo; reports a fixed title and advances with
/// wall-clock time
struct DemoPlayer {
    started: std::time::Instant,
}

impl PlayerAdapter for DemoPlayer {
    fn playhead(&self) -> Option<i64> {
        Some(self.started.elapsed().as_millis() as i64)
    }

    fn player_name(&self) -> Option<String> {
        Some("demo-player".to_string())
    }

    fn title(&self) -> Option<String> {
        Some("Big Buck Bunny".to_string())
    }

    fn duration(&self) -> Option<i64> {
        Some(596_000)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("videotracker=info".parse()?)
                .add_directive("videotracker_core=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut step_ms: u64 = 200;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("videotracker {}", videotracker::VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                let path = args.get(i + 1).context("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
                i += 2;
                continue;
            }
            "--step" | "-s" => {
                let value = args.get(i + 1).context("--step requires milliseconds")?;
                step_ms = value
                    .parse()
                    .with_context(|| format!("Invalid step: {value}"))?;
                i += 2;
                continue;
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                return Ok(());
            }
        }
    }

    let config = TrackerConfig::load(&config_path.unwrap_or_else(TrackerConfig::default_path));
    let registry = TrackerRegistry::global();

    let content = Tracker::content()
        .with_config(config.clone())
        .with_sink(Arc::new(TracingSink));
    let ad = Tracker::ad()
        .with_config(config)
        .with_sink(Arc::new(TracingSink));
    let id = registry.start(content, Some(ad));
    info!(session = %id, "Demo session registered");

    let worker = std::thread::spawn(move || run_session(registry, id, Duration::from_millis(step_ms)));
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("Session worker panicked"))??;

    registry.release(id);
    info!("Done");
    Ok(())
}

fn print_help() {
    println!("Usage: videotracker [OPTIONS]");
    println!();
    println!("Plays a scripted session (pre-roll ad, content with pause,");
    println!("seek and buffering) and logs every tracked event.");
    println!();
    println!("Options:");
    println!("  -c, --config PATH   Tracker config file (default: user config dir)");
    println!("  -s, --step MS       Delay between scripted steps (default: 200)");
    println!("  -v, --version       Show version");
    println!("  -h, --help          Show this help");
    println!();
    println!("Set RUST_LOG=videotracker_core=debug to see absorbed calls.");
}

fn run_session(registry: &TrackerRegistry, id: SessionId, step: Duration) -> Result<()> {
    let content = registry
        .content_tracker(id)
        .context("Content tracker missing")?;
    let ad = registry.ad_tracker(id).context("Ad tracker missing")?;
    let pause = || std::thread::sleep(step);

    let player_start = std::time::Instant::now();
    content.set_player(DemoPlayer {
        started: player_start,
    });
    content.send_request();

    // Pre-roll break with two ads
    ad.send_ad_break_start();
    for _ in 0..2 {
        ad.send_request();
        ad.send_start();
        for quartile in 1..=3 {
            pause();
            ad.send_ad_quartile(quartile);
        }
        ad.send_end();
    }
    ad.send_ad_break_end();

    content.send_buffer_start();
    pause();
    content.send_buffer_end();
    content.send_start();
    pause();
    content.send_heartbeat();

    content.send_pause();
    pause();
    // redundant, absorbed
    content.send_pause();
    content.send_resume();

    content.send_seek_start();
    content.send_buffer_start();
    pause();
    content.send_buffer_end();
    content.send_seek_end();

    pause();
    content.send_end();

    info!(
        videos = content.number_of_videos(),
        ads = content.number_of_ads(),
        playtime_ms = content.total_playtime_ms(),
        "Session finished"
    );
    Ok(())
}

//! VuMark Session Demo
//!
//! Walks a full session against the fake engine on real threads:
//! - UI thread drives lifecycle events and pumps messages
//! - A rendering thread draws at ~60 Hz
//! - Engine init runs on the background worker
//!
//! Pass a config file path as the first argument to override defaults.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use vumark_core::{HostUi, Orientation, Rotation, SessionConfig, SessionState};
use vumark_runtime::{BackgroundWorker, Gesture, SessionController};
use vumark_test::{FakeEngine, FakeVideoPlayer};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Prints host commands instead of touching a screen.
struct ConsoleHost;

impl HostUi for ConsoleHost {
    fn keep_screen_on(&mut self) {
        println!("[host] keep screen on");
    }

    fn show_surface(&mut self) {
        println!("[host] surface visible");
    }

    fn hide_surface(&mut self) {
        println!("[host] surface hidden");
    }

    fn hide_loading_indicator(&mut self) {
        println!("[host] loading indicator hidden");
    }

    fn show_error(&mut self, message: &str) {
        println!("[host] error dialog: {}", message);
    }

    fn show_notice(&mut self, message: &str) {
        println!("[host] notice: {}", message);
    }

    fn request_camera_permission(&mut self) {
        println!("[host] camera permission requested");
    }

    fn finish(&mut self) {
        println!("[host] finish");
    }
}

/// Pump UI messages until `state` is reached or `timeout` expires.
fn pump_until(controller: &mut SessionController, state: SessionState, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        controller.pump();
        if controller.state() == state {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

/// Pump UI messages for `duration` while frames are drawn.
fn run_for(controller: &mut SessionController, duration: Duration) {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        controller.pump();
        thread::sleep(Duration::from_millis(5));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== VuMark Session Demo ===");

    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(&PathBuf::from(path))?,
        None => SessionConfig::load_or_default(),
    };
    println!("Target: {:?}", config.target);
    println!("Reference texture: {}", config.reference_texture_path().display());

    let engine = Arc::new(FakeEngine::new());
    let video = Arc::new(FakeVideoPlayer::new());
    let mut controller = SessionController::new(
        engine.clone(),
        video.clone(),
        Box::new(ConsoleHost),
        config,
        BackgroundWorker::new()?,
    );

    // Rendering thread
    let running = Arc::new(AtomicBool::new(true));
    let mut renderer = controller.surface_renderer();
    let render_flag = Arc::clone(&running);
    let render_thread = thread::Builder::new()
        .name("vumark-render".into())
        .spawn(move || {
            renderer.on_surface_created();
            if let Err(e) = renderer.on_surface_changed(800, 600) {
                tracing::warn!("Video disabled: {}", e);
            }
            while render_flag.load(Ordering::Acquire) {
                renderer.on_draw_frame();
                thread::sleep(FRAME_INTERVAL);
            }
            renderer.on_surface_destroyed();
            renderer.stats().clone()
        })?;

    controller.on_display_changed(Orientation::Portrait, Rotation::Rotation0);
    controller.on_create(true);
    controller.on_resume(true);

    if !pump_until(&mut controller, SessionState::Tracking, Duration::from_secs(5)) {
        println!("Session did not reach tracking (state {})", controller.state());
    }
    run_for(&mut controller, Duration::from_millis(200));

    println!("\n--- tap to focus ---");
    controller.on_gesture(Gesture::SingleTap);
    controller.on_video_size_changed(1280, 720);
    run_for(&mut controller, Duration::from_millis(100));

    println!("\n--- rotate ---");
    controller.on_display_changed(Orientation::Landscape, Rotation::Rotation90);
    run_for(&mut controller, Duration::from_millis(100));

    println!("\n--- pause / resume ---");
    controller.on_pause();
    run_for(&mut controller, Duration::from_millis(100));
    controller.on_resume(true);
    run_for(&mut controller, Duration::from_millis(100));

    println!("\n--- back ---");
    controller.on_back_pressed();
    controller.on_destroy();

    running.store(false, Ordering::Release);
    let renderer_stats = render_thread
        .join()
        .map_err(|_| "render thread panicked")?;

    let stats = controller.stats();
    println!("\n=== Summary ===");
    println!("Final state:        {}", controller.state());
    println!("Starts / stops:     {} / {}", stats.starts, stats.stops);
    println!("Start failures:     {}", stats.start_failures);
    println!("Frames drawn:       {}", renderer_stats.frames_drawn);
    println!("Frames rendered:    {}", renderer_stats.frames_rendered);
    println!("Reconfigurations:   {}", renderer_stats.reconfigurations);
    println!("Engine calls:       {}", engine.calls().len());
    println!("Renders while idle: {}", engine.renders_while_stopped());
    println!("Video released:     {}", video.is_released());

    Ok(())
}

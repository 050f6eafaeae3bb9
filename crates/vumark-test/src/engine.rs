//! Fake AR engine

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use vumark_core::{ArEngine, ArError, ArResult, DisplayGeometry, TargetKind};

/// One call across the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    InitRendering,
    DeinitRendering,
    SetTextures { width: u32, height: u32, len: usize },
    ConfigureRendering(DisplayGeometry),
    RenderFrame,
    InitAr(TargetKind),
    DeinitAr,
    StartAr,
    StopAr,
    PerformAutoFocus,
    RestoreAutoFocus,
    InitVideoTexture,
    SurfaceChanged { width: u32, height: u32 },
    SetVideoSize { width: u32, height: u32 },
}

#[derive(Debug)]
struct Script {
    init_error: Option<String>,
    start_results: VecDeque<bool>,
    start_ok: bool,
    configure_ok: bool,
    render_ok: bool,
    video_texture: i32,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            init_error: None,
            start_results: VecDeque::new(),
            start_ok: true,
            configure_ok: true,
            render_ok: true,
            video_texture: 7,
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    held: bool,
    parked: bool,
}

/// Parks `configure_rendering` callers until released.
#[derive(Debug, Default)]
struct Gate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl Gate {
    fn pass(&self) {
        let mut state = self.state.lock();
        if !state.held {
            return;
        }
        state.parked = true;
        self.cond.notify_all();
        while state.held {
            self.cond.wait(&mut state);
        }
        state.parked = false;
    }
}

/// Scripted engine. Succeeds at everything unless told otherwise.
#[derive(Debug, Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    script: Mutex<Script>,
    started: Mutex<bool>,
    renders_while_stopped: Mutex<u64>,
    configure_gate: Gate,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init_ar` fail with the given message.
    pub fn fail_init(&self, message: &str) {
        self.script.lock().init_error = Some(message.to_string());
    }

    /// Queue one-shot results for the next `start_ar` calls.
    pub fn queue_start_results(&self, results: &[bool]) {
        self.script.lock().start_results.extend(results.iter().copied());
    }

    /// Result of `start_ar` once queued results are exhausted.
    pub fn set_start_ok(&self, ok: bool) {
        self.script.lock().start_ok = ok;
    }

    pub fn set_configure_ok(&self, ok: bool) {
        self.script.lock().configure_ok = ok;
    }

    pub fn set_render_ok(&self, ok: bool) {
        self.script.lock().render_ok = ok;
    }

    pub fn set_video_texture(&self, raw: i32) {
        self.script.lock().video_texture = raw;
    }

    /// Block subsequent `configure_rendering` calls inside the engine until
    /// [`release_configure`](Self::release_configure).
    pub fn hold_configure(&self) {
        self.configure_gate.state.lock().held = true;
    }

    pub fn release_configure(&self) {
        self.configure_gate.state.lock().held = false;
        self.configure_gate.cond.notify_all();
    }

    /// Wait until a `configure_rendering` call is parked on the hold.
    /// Returns `false` on timeout.
    pub fn wait_configure_parked(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.configure_gate.state.lock();
        while !state.parked {
            if self
                .configure_gate
                .cond
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.parked;
            }
        }
        true
    }

    pub fn is_configure_parked(&self) -> bool {
        self.configure_gate.state.lock().parked
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Index of the first call equal to `call`.
    pub fn position(&self, call: &EngineCall) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == call)
    }

    pub fn render_count(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::RenderFrame))
    }

    pub fn configure_count(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::ConfigureRendering(_)))
    }

    /// Whether the last `start_ar` succeeded and no `stop_ar` followed.
    pub fn is_started(&self) -> bool {
        *self.started.lock()
    }

    /// `render_frame` calls issued while the engine was not started.
    pub fn renders_while_stopped(&self) -> u64 {
        *self.renders_while_stopped.lock()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

impl ArEngine for FakeEngine {
    fn init_rendering(&self) {
        self.record(EngineCall::InitRendering);
    }

    fn deinit_rendering(&self) {
        self.record(EngineCall::DeinitRendering);
    }

    fn set_textures(&self, width: u32, height: u32, pixels: &[u8]) {
        self.record(EngineCall::SetTextures {
            width,
            height,
            len: pixels.len(),
        });
    }

    fn configure_rendering(&self, geometry: &DisplayGeometry) -> bool {
        self.record(EngineCall::ConfigureRendering(*geometry));
        self.configure_gate.pass();
        self.script.lock().configure_ok
    }

    fn render_frame(&self) -> bool {
        self.record(EngineCall::RenderFrame);
        if !*self.started.lock() {
            *self.renders_while_stopped.lock() += 1;
        }
        self.script.lock().render_ok
    }

    fn init_ar(&self, target: TargetKind) -> ArResult<()> {
        self.record(EngineCall::InitAr(target));
        match &self.script.lock().init_error {
            Some(message) => Err(ArError::InitFailed(message.clone())),
            None => Ok(()),
        }
    }

    fn deinit_ar(&self) {
        self.record(EngineCall::DeinitAr);
    }

    fn start_ar(&self) -> bool {
        self.record(EngineCall::StartAr);
        let ok = {
            let mut script = self.script.lock();
            let start_ok = script.start_ok;
            script.start_results.pop_front().unwrap_or(start_ok)
        };
        *self.started.lock() = ok;
        ok
    }

    fn stop_ar(&self) {
        self.record(EngineCall::StopAr);
        *self.started.lock() = false;
    }

    fn camera_perform_auto_focus(&self) {
        self.record(EngineCall::PerformAutoFocus);
    }

    fn camera_restore_auto_focus(&self) {
        self.record(EngineCall::RestoreAutoFocus);
    }

    fn init_video_texture(&self) -> i32 {
        self.record(EngineCall::InitVideoTexture);
        self.script.lock().video_texture
    }

    fn on_surface_changed(&self, width: u32, height: u32) {
        self.record(EngineCall::SurfaceChanged { width, height });
    }

    fn set_video_size(&self, width: u32, height: u32) {
        self.record(EngineCall::SetVideoSize { width, height });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vumark_core::{DisplayPose, SurfaceSize};

    #[test]
    fn test_queued_start_results_then_default() {
        let engine = FakeEngine::new();
        engine.queue_start_results(&[false]);

        assert!(!engine.start_ar());
        assert!(!engine.is_started());
        assert!(engine.start_ar());
        assert!(engine.is_started());
    }

    #[test]
    fn test_render_while_stopped_is_counted() {
        let engine = FakeEngine::new();
        engine.render_frame();
        assert_eq!(engine.renders_while_stopped(), 1);

        engine.start_ar();
        engine.render_frame();
        assert_eq!(engine.renders_while_stopped(), 1);

        engine.stop_ar();
        engine.render_frame();
        assert_eq!(engine.renders_while_stopped(), 2);
    }

    #[test]
    fn test_held_configure_parks_until_released() {
        let engine = std::sync::Arc::new(FakeEngine::new());
        engine.hold_configure();

        let caller = {
            let engine = engine.clone();
            let geometry = DisplayGeometry::new(SurfaceSize::new(800, 600), DisplayPose::default());
            std::thread::spawn(move || engine.configure_rendering(&geometry))
        };

        assert!(engine.wait_configure_parked(Duration::from_secs(5)));
        assert!(engine.is_configure_parked());
        engine.release_configure();

        assert!(caller.join().unwrap());
        assert!(!engine.is_configure_parked());
        assert_eq!(engine.configure_count(), 1);
    }

    #[test]
    fn test_init_failure() {
        let engine = FakeEngine::new();
        engine.fail_init("no camera");
        let err = engine.init_ar(TargetKind::Image).unwrap_err();
        assert!(matches!(err, ArError::InitFailed(ref m) if m == "no camera"));
    }
}

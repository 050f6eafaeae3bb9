//! UI-thread session controller

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use vumark_core::{
    ArEngine, ArError, ArResult, DisplayPose, HostUi, Orientation, PermissionState, Rotation,
    SessionConfig, SessionState, VideoPlayer,
};

use crate::message::post;
use crate::{
    ui_channel, AutoFocus, BackgroundWorker, Gesture, SessionHandle, SurfaceRenderer, UiMessage,
    UiReceiver, UiSender,
};

const PERMISSION_CANCELLED_NOTICE: &str = "The permission request was cancelled. You must grant \
     Camera permission to access AR features of this application.";
const PERMISSION_DENIED_NOTICE: &str =
    "You must grant Camera permission to access AR features of this application.";

#[derive(Clone, Debug, Default)]
pub struct ControllerStats {
    pub starts: u64,
    pub stops: u64,
    pub start_failures: u64,
}

/// Owns the session state machine. Lives on the UI thread; every host UI
/// command is issued from here.
pub struct SessionController {
    engine: Arc<dyn ArEngine>,
    video: Arc<dyn VideoPlayer>,
    host: Box<dyn HostUi>,
    session: SessionHandle,
    config: SessionConfig,
    worker: BackgroundWorker,
    focus: AutoFocus,
    ui_tx: UiSender,
    ui_rx: UiReceiver,
    permission: PermissionState,
    init_attempted: bool,
    foreground: bool,
    torn_down: bool,
    stats: ControllerStats,
}

impl SessionController {
    pub fn new(
        engine: Arc<dyn ArEngine>,
        video: Arc<dyn VideoPlayer>,
        host: Box<dyn HostUi>,
        config: SessionConfig,
        worker: BackgroundWorker,
    ) -> Self {
        let (ui_tx, ui_rx) = ui_channel();
        let session = SessionHandle::new();
        let focus = AutoFocus::new(
            Arc::clone(&engine),
            session.clone(),
            config.autofocus_restore_delay(),
        );

        SessionController {
            engine,
            video,
            host,
            session,
            config,
            worker,
            focus,
            ui_tx,
            ui_rx,
            permission: PermissionState::Unknown,
            init_attempted: false,
            foreground: false,
            torn_down: false,
            stats: ControllerStats::default(),
        }
    }

    /// Rendering-thread half bound to this session. Move it to the thread
    /// that owns the GL context.
    pub fn surface_renderer(&self) -> SurfaceRenderer {
        SurfaceRenderer::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.video),
            self.session.clone(),
            self.ui_tx.clone(),
            self.config.reference_texture_path(),
        )
    }

    /// Screen created. Initialization begins right away when the camera
    /// permission is already held; otherwise it waits for `on_resume`.
    pub fn on_create(&mut self, permission_granted: bool) {
        if self.config.keep_screen_on {
            self.host.keep_screen_on();
        }
        self.host.hide_surface();
        self.video.prepare(&self.config.playback_options());

        if permission_granted {
            self.permission = PermissionState::Granted;
            self.begin_init();
        }
    }

    pub fn on_resume(&mut self, permission_granted: bool) {
        self.foreground = true;
        if self.torn_down {
            return;
        }

        if !permission_granted {
            // Permission was withdrawn while we were in the background.
            if self.session.is_tracking() {
                self.permission = PermissionState::Denied;
                if let Err(e) = self.stop_tracking() {
                    tracing::warn!("Failed to stop after losing permission: {}", e);
                }
            }
            if self.permission != PermissionState::Requested {
                tracing::debug!("Requesting camera permission");
                self.permission = PermissionState::Requested;
                self.host.request_camera_permission();
            }
            return;
        }

        // A dialog still on screen resumes us; wait for its result.
        if self.permission == PermissionState::Requested {
            return;
        }
        self.permission = PermissionState::Granted;

        match self.session.state() {
            SessionState::Ready => self.try_start(),
            SessionState::Uninitialized if !self.init_attempted => self.begin_init(),
            _ => {}
        }
    }

    pub fn on_pause(&mut self) {
        self.foreground = false;
        if self.session.is_tracking() {
            if let Err(e) = self.stop_tracking() {
                tracing::warn!("Failed to stop on pause: {}", e);
            }
        }
    }

    /// Outcome of a camera permission request, one entry per requested
    /// permission. An empty slice means the request was cancelled.
    pub fn on_permission_result(&mut self, results: &[bool]) {
        if results.is_empty() {
            tracing::warn!("{}", ArError::PermissionCancelled);
            self.permission = PermissionState::Denied;
            self.host.show_notice(PERMISSION_CANCELLED_NOTICE);
            self.host.finish();
            return;
        }

        if results.iter().all(|granted| *granted) {
            self.permission = PermissionState::Granted;
            if self.session.state() == SessionState::Uninitialized && !self.init_attempted {
                self.begin_init();
            }
        } else {
            tracing::warn!("{}", ArError::PermissionDenied);
            self.permission = PermissionState::Denied;
            self.host.show_notice(PERMISSION_DENIED_NOTICE);
            self.host.finish();
        }
    }

    /// Camera permission withdrawn while the screen is alive.
    pub fn on_permission_revoked(&mut self) {
        self.permission = PermissionState::Denied;
        if self.session.is_tracking() {
            if let Err(e) = self.stop_tracking() {
                tracing::warn!("Failed to stop after permission revoked: {}", e);
            }
        }
    }

    /// Apply every queued message. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.ui_rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    pub fn handle_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::InitFinished(result) => self.on_init_finished(result),
            UiMessage::AttachVideoTexture(texture) => {
                if !self.torn_down {
                    self.video.attach_texture(texture);
                }
            }
            UiMessage::FirstFrameRendered => self.host.hide_loading_indicator(),
        }
    }

    /// `Ready -> Tracking`. On failure the state stays `Ready` and the
    /// surface stays hidden.
    pub fn start_tracking(&mut self) -> ArResult<()> {
        let state = self.session.state();
        if state != SessionState::Ready {
            return Err(ArError::InvalidTransition {
                from: state,
                to: SessionState::Tracking,
            });
        }

        if !self.engine.start_ar() {
            self.stats.start_failures += 1;
            self.host.hide_surface();
            return Err(ArError::StartFailed);
        }

        self.session.transition(SessionState::Tracking)?;
        self.stats.starts += 1;
        self.host.show_surface();
        Ok(())
    }

    /// `Tracking -> Stopping -> Ready`.
    pub fn stop_tracking(&mut self) -> ArResult<()> {
        let state = self.session.state();
        if state != SessionState::Tracking {
            return Err(ArError::InvalidTransition {
                from: state,
                to: SessionState::Stopping,
            });
        }

        self.session.transition(SessionState::Stopping)?;
        self.engine.stop_ar();
        self.stats.stops += 1;
        self.session.transition(SessionState::Ready)?;
        Ok(())
    }

    /// The user dismissed the init error.
    pub fn acknowledge_error(&mut self) {
        self.teardown();
        self.host.finish();
    }

    pub fn on_back_pressed(&mut self) {
        self.teardown();
        self.host.finish();
    }

    pub fn on_destroy(&mut self) {
        self.video.release();
        self.teardown();
    }

    /// Returns whether the gesture was consumed.
    pub fn on_gesture(&mut self, gesture: Gesture) -> bool {
        if gesture == Gesture::SingleTap && !self.session.is_tracking() {
            return false;
        }
        self.focus.on_gesture(gesture, &self.worker)
    }

    pub fn on_display_changed(&mut self, orientation: Orientation, rotation: Rotation) {
        let pose = DisplayPose::new(orientation, rotation);
        if self.session.set_pose(pose) {
            tracing::debug!("Display now {:?} at {} degrees", orientation, rotation.degrees());
        }
    }

    pub fn on_video_size_changed(&mut self, width: u32, height: u32) {
        self.engine.set_video_size(width, height);
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn begin_init(&mut self) {
        if self.torn_down {
            return;
        }
        if let Err(e) = self.session.transition(SessionState::Initializing) {
            tracing::warn!("Not initializing: {}", e);
            return;
        }
        self.init_attempted = true;

        let engine = Arc::clone(&self.engine);
        let tx = self.ui_tx.clone();
        let target = self.config.target;
        tracing::info!("Initializing AR engine for {:?} target", target);

        self.worker.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| engine.init_ar(target)))
                .unwrap_or_else(|_| {
                    Err(ArError::Worker("engine initialization panicked".to_string()))
                });
            post(&tx, UiMessage::InitFinished(result));
        });
    }

    fn on_init_finished(&mut self, result: ArResult<()>) {
        if self.torn_down {
            // The session came up after teardown already ran; release it.
            if result.is_ok() {
                tracing::debug!("Releasing engine initialized after teardown");
                self.engine.deinit_ar();
            }
            return;
        }

        let state = self.session.state();
        if state != SessionState::Initializing {
            tracing::warn!("Ignoring init completion in state {}", state);
            return;
        }

        match result {
            Ok(()) => {
                if let Err(e) = self.session.transition(SessionState::Ready) {
                    tracing::warn!("{}", e);
                    return;
                }
                if self.foreground {
                    self.try_start();
                } else {
                    tracing::debug!("Init finished in background, start deferred to resume");
                }
            }
            Err(e) => {
                tracing::error!("AR initialization failed: {}", e);
                if let Err(e) = self.session.transition(SessionState::Uninitialized) {
                    tracing::warn!("{}", e);
                }
                self.host.show_error(&e.to_string());
            }
        }
    }

    fn try_start(&mut self) {
        if let Err(e) = self.start_tracking() {
            tracing::error!("Failed to start AR: {}", e);
        }
    }

    /// Stop and deinitialize regardless of how far the session got. Runs at
    /// most once.
    fn teardown(&mut self) {
        if self.torn_down {
            tracing::debug!("Teardown already done");
            return;
        }
        self.torn_down = true;
        self.host.hide_surface();

        let was_tracking = self.session.is_tracking();
        if let Err(e) = self.session.transition(SessionState::Stopping) {
            tracing::warn!("{}", e);
        }
        self.engine.stop_ar();
        if was_tracking {
            self.stats.stops += 1;
        }

        // Wait out a draw that checked the state before we left tracking.
        let _guard = self.session.engine_guard();
        self.engine.deinit_ar();
        if let Err(e) = self.session.transition(SessionState::Uninitialized) {
            tracing::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vumark_test::{EngineCall, FakeEngine, FakeVideoPlayer, HostCall, RecordingHost};

    struct Rig {
        engine: Arc<FakeEngine>,
        video: Arc<FakeVideoPlayer>,
        host: RecordingHost,
        controller: SessionController,
    }

    fn rig() -> Rig {
        let engine = Arc::new(FakeEngine::new());
        let video = Arc::new(FakeVideoPlayer::new());
        let host = RecordingHost::new();
        let controller = SessionController::new(
            engine.clone(),
            video.clone(),
            Box::new(host.clone()),
            SessionConfig::default(),
            BackgroundWorker::inline(),
        );

        Rig {
            engine,
            video,
            host,
            controller,
        }
    }

    #[test]
    fn test_create_with_permission_reaches_tracking() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        assert_eq!(rig.controller.state(), SessionState::Initializing);

        assert_eq!(rig.controller.pump(), 1);
        assert_eq!(rig.controller.state(), SessionState::Tracking);
        assert!(rig.host.contains(&HostCall::ShowSurface));
        assert_eq!(rig.controller.stats().starts, 1);
    }

    #[test]
    fn test_create_prepares_video_and_hides_surface() {
        let mut rig = rig();
        rig.controller.on_create(false);

        assert_eq!(
            rig.host.calls(),
            vec![HostCall::KeepScreenOn, HostCall::HideSurface]
        );
        assert_eq!(rig.video.calls().len(), 1);
        assert!(rig.engine.calls().is_empty());
    }

    #[test]
    fn test_permission_requested_once() {
        let mut rig = rig();
        rig.controller.on_create(false);
        rig.controller.on_resume(false);
        rig.controller.on_pause();
        rig.controller.on_resume(false);

        assert_eq!(rig.host.count(&HostCall::RequestCameraPermission), 1);
        assert_eq!(rig.controller.permission(), PermissionState::Requested);
    }

    #[test]
    fn test_permission_granted_begins_init() {
        let mut rig = rig();
        rig.controller.on_create(false);
        rig.controller.on_resume(false);
        rig.controller.on_permission_result(&[true]);
        rig.controller.on_resume(true);
        rig.controller.pump();

        assert_eq!(rig.engine.count(|c| matches!(c, EngineCall::InitAr(_))), 1);
        assert_eq!(rig.controller.state(), SessionState::Tracking);
    }

    #[test]
    fn test_cancelled_permission_request_exits() {
        let mut rig = rig();
        rig.controller.on_create(false);
        rig.controller.on_resume(false);
        rig.controller.on_permission_result(&[]);

        assert_eq!(
            rig.host.notices(),
            vec![PERMISSION_CANCELLED_NOTICE.to_string()]
        );
        assert!(rig.host.finished());
        assert!(rig.engine.calls().is_empty());
    }

    #[test]
    fn test_start_failure_stays_ready_until_next_resume() {
        let mut rig = rig();
        rig.engine.queue_start_results(&[false]);
        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        rig.controller.pump();

        assert_eq!(rig.controller.state(), SessionState::Ready);
        assert!(!rig.host.contains(&HostCall::ShowSurface));
        assert_eq!(rig.controller.stats().start_failures, 1);

        rig.controller.on_pause();
        rig.controller.on_resume(true);
        assert_eq!(rig.controller.state(), SessionState::Tracking);
        assert!(rig.host.contains(&HostCall::ShowSurface));
    }

    #[test]
    fn test_init_finished_in_background_defers_start() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.pump();

        assert_eq!(rig.controller.state(), SessionState::Ready);
        assert_eq!(rig.engine.count(|c| *c == EngineCall::StartAr), 0);

        rig.controller.on_resume(true);
        assert_eq!(rig.controller.state(), SessionState::Tracking);
    }

    #[test]
    fn test_init_finishing_after_teardown_is_released() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.on_back_pressed();
        rig.controller.pump();

        assert_eq!(rig.controller.state(), SessionState::Uninitialized);
        assert_eq!(rig.engine.count(|c| *c == EngineCall::DeinitAr), 2);
        assert_eq!(rig.engine.count(|c| *c == EngineCall::StartAr), 0);
    }

    #[test]
    fn test_permission_revoked_stops_tracking() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        rig.controller.pump();

        rig.controller.on_permission_revoked();
        assert_eq!(rig.controller.state(), SessionState::Ready);
        assert!(!rig.engine.is_started());
        assert_eq!(rig.controller.permission(), PermissionState::Denied);
    }

    #[test]
    fn test_resume_without_permission_stops_tracking() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        rig.controller.pump();
        assert_eq!(rig.controller.state(), SessionState::Tracking);
        rig.engine.clear_calls();

        rig.controller.on_resume(false);

        assert_eq!(rig.controller.state(), SessionState::Ready);
        assert_eq!(rig.engine.calls(), vec![EngineCall::StopAr]);
        assert!(!rig.engine.is_started());
        assert_eq!(rig.host.count(&HostCall::RequestCameraPermission), 1);
        assert_eq!(rig.controller.permission(), PermissionState::Requested);
    }

    #[test]
    fn test_permission_regranted_after_resume_restarts() {
        let mut rig = rig();
        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        rig.controller.pump();

        rig.controller.on_resume(false);
        rig.controller.on_permission_result(&[true]);
        rig.controller.on_resume(true);

        assert_eq!(rig.controller.state(), SessionState::Tracking);
        assert_eq!(rig.controller.stats().starts, 2);
        assert_eq!(rig.controller.stats().stops, 1);
    }

    #[test]
    fn test_single_tap_requires_tracking() {
        let mut rig = rig();
        assert!(!rig.controller.on_gesture(Gesture::SingleTap));
        assert!(rig.controller.on_gesture(Gesture::DoubleTap));
        assert!(rig.engine.calls().is_empty());

        rig.controller.on_create(true);
        rig.controller.on_resume(true);
        rig.controller.pump();
        rig.engine.clear_calls();

        assert!(rig.controller.on_gesture(Gesture::SingleTap));
        assert_eq!(
            rig.engine.calls(),
            vec![EngineCall::PerformAutoFocus, EngineCall::RestoreAutoFocus]
        );
    }

    #[test]
    fn test_video_texture_bound_on_ui_thread() {
        let mut rig = rig();
        let mut renderer = rig.controller.surface_renderer();
        renderer.on_surface_changed(800, 600).ok();

        assert!(rig.video.attached().is_none());
        rig.controller.pump();
        assert_eq!(rig.video.attached().map(|t| t.raw()), Some(7));
    }

    #[test]
    fn test_video_size_forwarded() {
        let mut rig = rig();
        rig.controller.on_video_size_changed(1280, 720);
        assert_eq!(
            rig.engine.calls(),
            vec![EngineCall::SetVideoSize {
                width: 1280,
                height: 720
            }]
        );
    }

    #[test]
    fn test_stop_tracking_outside_tracking_is_rejected() {
        let mut rig = rig();
        let err = rig.controller.stop_tracking().unwrap_err();
        assert!(matches!(err, ArError::InvalidTransition { .. }));
        assert!(rig.engine.calls().is_empty());
    }
}

//! Ordering properties over random host event sequences.

use std::sync::Arc;

use proptest::prelude::*;

use vumark_core::{Orientation, Rotation, SessionConfig, SessionState};
use vumark_runtime::{BackgroundWorker, Gesture, SessionController};
use vumark_test::{EngineCall, FakeEngine, FakeVideoPlayer, RecordingHost};

#[derive(Debug, Clone)]
enum Event {
    Create(bool),
    Resume(bool),
    Pause,
    PermissionResult(Vec<bool>),
    PermissionRevoked,
    Pump,
    SurfaceCreated,
    SurfaceChanged(u32, u32),
    SurfaceDestroyed,
    Draw,
    DisplayChanged(i32, i32),
    Tap,
    NextStartFails,
    Back,
    Destroy,
    Acknowledge,
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        any::<bool>().prop_map(Event::Create),
        any::<bool>().prop_map(Event::Resume),
        Just(Event::Pause),
        prop::collection::vec(any::<bool>(), 0..2).prop_map(Event::PermissionResult),
        Just(Event::PermissionRevoked),
        Just(Event::Pump),
        Just(Event::SurfaceCreated),
        (1u32..2000, 1u32..2000).prop_map(|(w, h)| Event::SurfaceChanged(w, h)),
        Just(Event::SurfaceDestroyed),
        Just(Event::Draw),
        Just(Event::Draw),
        Just(Event::Draw),
        (0i32..3, 0i32..4).prop_map(|(o, r)| Event::DisplayChanged(o, r)),
        Just(Event::Tap),
        Just(Event::NextStartFails),
        Just(Event::Back),
        Just(Event::Destroy),
        Just(Event::Acknowledge),
    ]
}

proptest! {
    #[test]
    fn render_only_after_successful_start(
        events in prop::collection::vec(event(), 1..80),
        init_fails in any::<bool>(),
    ) {
        let engine = Arc::new(FakeEngine::new());
        if init_fails {
            engine.fail_init("scripted failure");
        }
        let video = Arc::new(FakeVideoPlayer::new());
        let mut controller = SessionController::new(
            engine.clone(),
            video,
            Box::new(RecordingHost::new()),
            SessionConfig::default(),
            BackgroundWorker::inline(),
        );
        let mut renderer = controller.surface_renderer();

        let mut surface: Option<(u32, u32)> = None;
        for event in events {
            let renders_before = engine.render_count();

            match event {
                Event::Create(granted) => controller.on_create(granted),
                Event::Resume(granted) => controller.on_resume(granted),
                Event::Pause => controller.on_pause(),
                Event::PermissionResult(results) => controller.on_permission_result(&results),
                Event::PermissionRevoked => controller.on_permission_revoked(),
                Event::Pump => {
                    controller.pump();
                }
                Event::SurfaceCreated => renderer.on_surface_created(),
                Event::SurfaceChanged(w, h) => {
                    let _ = renderer.on_surface_changed(w, h);
                    surface = Some((w, h));
                }
                Event::SurfaceDestroyed => {
                    renderer.on_surface_destroyed();
                    surface = None;
                }
                Event::Draw => {
                    let rendered = renderer.on_draw_frame();
                    if rendered {
                        prop_assert_eq!(controller.state(), SessionState::Tracking);
                    }
                }
                Event::DisplayChanged(o, r) => {
                    controller.on_display_changed(Orientation::from_raw(o), Rotation::from_raw(r))
                }
                Event::Tap => {
                    controller.on_gesture(Gesture::SingleTap);
                }
                Event::NextStartFails => engine.queue_start_results(&[false]),
                Event::Back => controller.on_back_pressed(),
                Event::Destroy => controller.on_destroy(),
                Event::Acknowledge => controller.acknowledge_error(),
            }

            // Any new render ran against the current geometry.
            if engine.render_count() > renders_before {
                let calls = engine.calls();
                let configured = calls.iter().rev().find_map(|c| match c {
                    EngineCall::ConfigureRendering(g) => Some(*g),
                    _ => None,
                });
                let geometry = configured.expect("render without configuration");
                let pose = controller.session().pose();
                prop_assert_eq!(Some((geometry.width, geometry.height)), surface);
                prop_assert_eq!(geometry.pose(), pose);
            }

            prop_assert_eq!(engine.renders_while_stopped(), 0);
        }

        // Once deinitialized, the engine is never started or rendered again.
        let calls = engine.calls();
        if let Some(deinit) = calls.iter().position(|c| *c == EngineCall::DeinitAr) {
            prop_assert!(!calls[deinit..]
                .iter()
                .any(|c| matches!(c, EngineCall::RenderFrame | EngineCall::StartAr)));
        }

        // Every surface change is followed by a configure before the next render.
        let mut stale = false;
        for call in engine.calls() {
            match call {
                EngineCall::SurfaceChanged { .. } => stale = true,
                EngineCall::ConfigureRendering(_) => stale = false,
                EngineCall::RenderFrame => prop_assert!(!stale),
                _ => {}
            }
        }
    }
}

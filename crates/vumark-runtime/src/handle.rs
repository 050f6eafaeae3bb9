//! Shared session handle

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use vumark_core::{ArError, ArResult, DisplayPose, SessionState};

struct Shared {
    state: RwLock<SessionState>,
    pose: Mutex<DisplayPose>,
    engine: Mutex<()>,
}

/// State shared between the UI thread and the rendering thread.
///
/// Cloning is cheap; all clones observe the same session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Shared>,
}

impl SessionHandle {
    pub fn new() -> Self {
        SessionHandle {
            inner: Arc::new(Shared {
                state: RwLock::new(SessionState::Uninitialized),
                pose: Mutex::new(DisplayPose::default()),
                engine: Mutex::new(()),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    pub fn is_tracking(&self) -> bool {
        self.state().is_tracking()
    }

    /// Move to `to` if the transition is legal. Returns the previous state.
    pub fn transition(&self, to: SessionState) -> ArResult<SessionState> {
        let mut state = self.inner.state.write();
        let from = *state;
        if !from.can_transition_to(to) {
            return Err(ArError::InvalidTransition { from, to });
        }
        *state = to;
        drop(state);

        tracing::info!("Session {} -> {}", from, to);
        Ok(from)
    }

    /// Exclusive access to the engine for a check-then-call sequence.
    ///
    /// The renderer holds this across its tracking check, configure and
    /// render. Teardown takes it after leaving `Tracking` and before
    /// `deinit_ar`, so an in-flight draw finishes before the engine is
    /// released. Never acquire it while holding the state lock.
    pub fn engine_guard(&self) -> MutexGuard<'_, ()> {
        self.inner.engine.lock()
    }

    /// Current display orientation and rotation.
    pub fn pose(&self) -> DisplayPose {
        *self.inner.pose.lock()
    }

    /// Returns `true` if the pose changed.
    pub fn set_pose(&self, pose: DisplayPose) -> bool {
        let mut current = self.inner.pose.lock();
        if *current == pose {
            return false;
        }
        *current = pose;
        true
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

//! Tap-to-focus handling

use std::sync::Arc;
use std::time::Duration;

use vumark_core::ArEngine;

use crate::{BackgroundWorker, SessionHandle};

/// Gestures the host forwards after recognizing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleTap,
    DoubleTap,
}

/// Triggers a one-shot autofocus on tap and restores the continuous focus
/// mode after a fixed delay. The restore is skipped if the session has
/// stopped tracking by then.
pub struct AutoFocus {
    engine: Arc<dyn ArEngine>,
    session: SessionHandle,
    restore_delay: Duration,
}

impl AutoFocus {
    pub fn new(engine: Arc<dyn ArEngine>, session: SessionHandle, restore_delay: Duration) -> Self {
        AutoFocus {
            engine,
            session,
            restore_delay,
        }
    }

    pub fn restore_delay(&self) -> Duration {
        self.restore_delay
    }

    /// Returns whether the gesture was consumed. Double taps are consumed
    /// without any action.
    pub fn on_gesture(&self, gesture: Gesture, worker: &BackgroundWorker) -> bool {
        match gesture {
            Gesture::SingleTap => {
                self.engine.camera_perform_auto_focus();

                let engine = Arc::clone(&self.engine);
                let session = self.session.clone();
                worker.spawn_delayed(self.restore_delay, move || {
                    let _guard = session.engine_guard();
                    if session.is_tracking() {
                        engine.camera_restore_auto_focus();
                    } else {
                        tracing::debug!("Session stopped; autofocus restore skipped");
                    }
                });
                true
            }
            Gesture::DoubleTap => true,
        }
    }
}
